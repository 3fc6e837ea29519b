// src/services/report.rs
use serde::Serialize;
use crate::models::PropertyAnalysis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: SummarySection,
    pub returns: ReturnsSection,
    pub purchase_breakdown: PurchaseBreakdown,
    pub monthly_breakdown: MonthlyBreakdown,
    pub long_term: LongTermSection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarySection {
    pub purchase_price: String,
    pub total_cash_needed: String,
    pub monthly_cash_flow: String,
    pub annual_cash_flow: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnsSection {
    pub cash_on_cash_return: String,
    pub cap_rate: String,
    pub annual_roi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseBreakdown {
    pub purchase_price: String,
    pub down_payment: String,
    pub loan_amount: String,
    pub closing_costs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    pub rental_income: String,
    pub expenses: String,
    pub mortgage_payment: String,
    pub net_cash_flow: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongTermSection {
    pub total_profit: String,
    pub total_equity: String,
}

const NOT_AVAILABLE: &str = "N/A";

/// Renders a dollar amount as `$1,234,567.89`. Negative amounts keep the
/// sign after the symbol: `$-1,234.50`. NaN and infinities render as `N/A`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    let fixed = format!("{:.2}", value);
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, cents) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("${}{}.{}", sign, grouped, cents)
}

pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", value)
}

pub fn generate_analysis_report(analysis: &PropertyAnalysis) -> AnalysisReport {
    AnalysisReport {
        summary: SummarySection {
            purchase_price: format_currency(analysis.purchase_price),
            total_cash_needed: format_currency(analysis.total_cash_needed),
            monthly_cash_flow: format_currency(analysis.monthly_cash_flow),
            annual_cash_flow: format_currency(analysis.annual_cash_flow),
        },
        returns: ReturnsSection {
            cash_on_cash_return: format_percentage(analysis.cash_on_cash_return),
            cap_rate: format_percentage(analysis.cap_rate),
            annual_roi: format_percentage(analysis.annual_roi),
        },
        purchase_breakdown: PurchaseBreakdown {
            purchase_price: format_currency(analysis.purchase_price),
            down_payment: format_currency(analysis.down_payment),
            loan_amount: format_currency(analysis.loan_amount),
            closing_costs: format_currency(analysis.closing_costs),
        },
        monthly_breakdown: MonthlyBreakdown {
            rental_income: format_currency(analysis.monthly_rental_income),
            expenses: format_currency(analysis.monthly_expenses),
            mortgage_payment: format_currency(analysis.monthly_mortgage_payment),
            net_cash_flow: format_currency(analysis.monthly_cash_flow),
        },
        long_term: LongTermSection {
            total_profit: format_currency(analysis.total_profit),
            total_equity: format_currency(analysis.total_equity),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinancialAssumptions, Property, PropertyType};
    use crate::services::analyzer::calculate_property_analysis;

    fn sample_report() -> AnalysisReport {
        let property = Property {
            address: "123 Main St".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            zip_code: "94102".to_string(),
            purchase_price: 500_000.0,
            property_type: PropertyType::SingleFamily,
            bedrooms: 3,
            bathrooms: 2.0,
            square_feet: 1500,
            year_built: 2000,
            lot_size: None,
            listing_url: None,
            mls_number: None,
            property_id: None,
            created_at: None,
            updated_at: None,
        };
        let assumptions = FinancialAssumptions {
            monthly_rent: 3000.0,
            property_tax_annual: 5000.0,
            insurance_annual: 1200.0,
            ..Default::default()
        };
        generate_analysis_report(&calculate_property_analysis(&property, &assumptions))
    }

    fn has_two_decimals(text: &str) -> bool {
        text.rsplit_once('.')
            .map(|(_, cents)| cents.len() == 2 && cents.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1000.0), "$1,000.00");
        assert_eq!(format_currency(500_000.0), "$500,000.00");
        assert_eq!(format_currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_currency(-927.8), "$-927.80");
        assert_eq!(format_currency(-11_133.6), "$-11,133.60");
    }

    #[test]
    fn percentage_format() {
        assert_eq!(format_percentage(5.678), "5.68%");
        assert_eq!(format_percentage(-9.1), "-9.10%");
        assert_eq!(format_percentage(0.0), "0.00%");
    }

    #[test]
    fn non_finite_values_are_not_available() {
        assert_eq!(format_currency(f64::NAN), "N/A");
        assert_eq!(format_currency(f64::INFINITY), "N/A");
        assert_eq!(format_currency(f64::NEG_INFINITY), "N/A");
        assert_eq!(format_percentage(f64::NAN), "N/A");
        assert_eq!(format_percentage(f64::INFINITY), "N/A");
    }

    #[test]
    fn report_sections_are_formatted() {
        let report = sample_report();

        assert_eq!(report.summary.purchase_price, "$500,000.00");
        assert_eq!(report.purchase_breakdown.down_payment, "$100,000.00");
        assert_eq!(report.purchase_breakdown.closing_costs, "$15,000.00");
        assert_eq!(report.summary.total_cash_needed, "$115,000.00");

        let currencies = [
            &report.summary.purchase_price,
            &report.summary.total_cash_needed,
            &report.summary.monthly_cash_flow,
            &report.summary.annual_cash_flow,
            &report.purchase_breakdown.loan_amount,
            &report.monthly_breakdown.rental_income,
            &report.monthly_breakdown.expenses,
            &report.monthly_breakdown.mortgage_payment,
            &report.monthly_breakdown.net_cash_flow,
            &report.long_term.total_profit,
            &report.long_term.total_equity,
        ];
        for value in currencies {
            assert!(value.starts_with('$'), "{value}");
            assert!(has_two_decimals(value), "{value}");
        }

        for rate in [&report.returns.cap_rate, &report.returns.cash_on_cash_return, &report.returns.annual_roi] {
            assert!(rate.ends_with('%'), "{rate}");
        }
    }

    #[test]
    fn report_serializes_to_nested_sections() {
        let value = serde_json::to_value(sample_report()).unwrap();
        for section in ["summary", "returns", "purchase_breakdown", "monthly_breakdown", "long_term"] {
            assert!(value.get(section).is_some(), "missing {section}");
        }
        assert_eq!(value["monthly_breakdown"]["net_cash_flow"], value["summary"]["monthly_cash_flow"]);
    }
}
