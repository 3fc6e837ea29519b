// src/services/analyzer.rs
use chrono::Utc;
use log::debug;
use crate::models::{FinancialAssumptions, Property, PropertyAnalysis};

const MONTHS_PER_YEAR: f64 = 12.0;

fn percent_of(value: f64, percentage: f64) -> f64 {
    value * (percentage / 100.0)
}

/// Share of `numerator` in `denominator` as a percentage, or 0 when the
/// denominator is not positive.
fn ratio_percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

/// Monthly payment on a fixed-rate amortizing loan.
///
/// `annual_rate` is a percentage (7.0 for 7%). A zero rate spreads the
/// principal evenly over the term.
pub fn calculate_mortgage_payment(loan_amount: f64, annual_rate: f64, years: u32) -> f64 {
    let num_payments = years as f64 * MONTHS_PER_YEAR;
    if annual_rate == 0.0 {
        return loan_amount / num_payments;
    }

    let monthly_rate = (annual_rate / 100.0) / MONTHS_PER_YEAR;
    let growth = (1.0 + monthly_rate).powf(num_payments);
    loan_amount * (monthly_rate * growth) / (growth - 1.0)
}

/// Principal retired over the holding period.
///
/// This is a simplified approximation rather than a sum over the amortization
/// schedule. An all-cash purchase has no loan and therefore no principal.
fn approximate_principal_paid(loan_amount: f64, annual_mortgage: f64, holding_years: u32) -> f64 {
    if loan_amount <= 0.0 {
        return 0.0;
    }
    let remaining_share = 1.0 - annual_mortgage / loan_amount;
    loan_amount - loan_amount * remaining_share.powi(holding_years as i32)
}

pub fn calculate_property_analysis(
    property: &Property,
    assumptions: &FinancialAssumptions,
) -> PropertyAnalysis {
    let purchase_price = property.purchase_price;

    // Purchase
    let down_payment = percent_of(purchase_price, assumptions.down_payment_percentage);
    let loan_amount = purchase_price - down_payment;
    let closing_costs = percent_of(purchase_price, assumptions.closing_costs_percentage);
    let total_cash_needed = down_payment + closing_costs;

    let monthly_mortgage = calculate_mortgage_payment(
        loan_amount,
        assumptions.interest_rate,
        assumptions.loan_term_years,
    );

    // Income
    let gross_monthly_rent = assumptions.monthly_rent;
    let vacancy_loss = percent_of(gross_monthly_rent, assumptions.vacancy_rate);
    let monthly_rental_income = gross_monthly_rent - vacancy_loss + assumptions.other_monthly_income;

    // Expenses; maintenance and management are charged on gross rent
    let monthly_expenses = assumptions.property_tax_annual / MONTHS_PER_YEAR
        + assumptions.insurance_annual / MONTHS_PER_YEAR
        + assumptions.hoa_monthly
        + percent_of(gross_monthly_rent, assumptions.maintenance_percentage)
        + percent_of(gross_monthly_rent, assumptions.property_management_percentage)
        + assumptions.utilities_monthly;

    let monthly_cash_flow = monthly_rental_income - monthly_expenses - monthly_mortgage;
    let annual_cash_flow = monthly_cash_flow * MONTHS_PER_YEAR;
    let annual_noi = (monthly_rental_income - monthly_expenses) * MONTHS_PER_YEAR;

    let cash_on_cash_return = ratio_percentage(annual_cash_flow, total_cash_needed);
    let cap_rate = ratio_percentage(annual_noi, purchase_price);
    // Reported separately but currently the same figure as cash-on-cash.
    let annual_roi = ratio_percentage(annual_cash_flow, total_cash_needed);

    // Long-term projections
    let holding_years = assumptions.holding_period_years;
    let future_value = purchase_price
        * (1.0 + assumptions.appreciation_rate / 100.0).powi(holding_years as i32);
    let principal_paid = approximate_principal_paid(
        loan_amount,
        monthly_mortgage * MONTHS_PER_YEAR,
        holding_years,
    );
    let total_equity = down_payment + principal_paid + (future_value - purchase_price);
    let total_profit = annual_cash_flow * holding_years as f64 + total_equity - total_cash_needed;

    debug!(
        "Analyzed property {:?}: cash flow {:.2}/month, cap rate {:.2}%",
        property.property_id, monthly_cash_flow, cap_rate
    );

    PropertyAnalysis {
        property_id: property.property_id.clone().unwrap_or_default(),
        analysis_date: Utc::now(),
        purchase_price,
        down_payment,
        loan_amount,
        closing_costs,
        total_cash_needed,
        monthly_rental_income,
        monthly_expenses,
        monthly_mortgage_payment: monthly_mortgage,
        monthly_cash_flow,
        annual_cash_flow,
        annual_roi,
        cash_on_cash_return,
        cap_rate,
        total_profit,
        total_equity,
        irr: None,
        analysis_id: None,
        created_at: None,
    }
}
