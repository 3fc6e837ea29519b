// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    MultiFamily,
    Condo,
    Townhouse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub purchase_price: f64,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: u32,
    pub year_built: i32,
    #[serde(default)]
    pub lot_size: Option<f64>,
    #[serde(default)]
    pub listing_url: Option<String>,
    #[serde(default)]
    pub mls_number: Option<String>,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Financial assumptions for a property analysis.
///
/// Percentages are plain numbers (7.0 means 7%). Every field falls back to
/// its default when missing from a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialAssumptions {
    pub down_payment_percentage: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub closing_costs_percentage: f64,

    // Income
    pub monthly_rent: f64,
    pub vacancy_rate: f64,
    pub other_monthly_income: f64,

    // Expenses
    pub property_tax_annual: f64,
    pub insurance_annual: f64,
    pub hoa_monthly: f64,
    pub maintenance_percentage: f64, // of gross rent
    pub property_management_percentage: f64, // of gross rent
    pub utilities_monthly: f64,

    // Appreciation and holding
    pub appreciation_rate: f64,
    pub holding_period_years: u32,
}

impl Default for FinancialAssumptions {
    fn default() -> Self {
        FinancialAssumptions {
            down_payment_percentage: 20.0,
            interest_rate: 7.0,
            loan_term_years: 30,
            closing_costs_percentage: 3.0,
            monthly_rent: 0.0,
            vacancy_rate: 5.0,
            other_monthly_income: 0.0,
            property_tax_annual: 0.0,
            insurance_annual: 0.0,
            hoa_monthly: 0.0,
            maintenance_percentage: 10.0,
            property_management_percentage: 10.0,
            utilities_monthly: 0.0,
            appreciation_rate: 3.0,
            holding_period_years: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAnalysis {
    pub property_id: String,
    pub analysis_date: DateTime<Utc>,

    // Purchase details
    pub purchase_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    pub closing_costs: f64,
    pub total_cash_needed: f64,

    // Monthly cash flow
    pub monthly_rental_income: f64,
    pub monthly_expenses: f64,
    pub monthly_mortgage_payment: f64,
    pub monthly_cash_flow: f64,

    // Annual metrics
    pub annual_cash_flow: f64,
    pub annual_roi: f64,
    pub cash_on_cash_return: f64,
    pub cap_rate: f64,

    // Long-term projections
    pub total_profit: f64,
    pub total_equity: f64,
    #[serde(default)]
    pub irr: Option<f64>,

    #[serde(default)]
    pub analysis_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid value for {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError { field, reason: reason.into() }
    }
}

/// Property fields as they arrive in a request body. Counts are signed here
/// so that a negative value is reported by `validate` rather than by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyInput {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub purchase_price: f64,
    pub property_type: PropertyType,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub square_feet: i64,
    pub year_built: i32,
    #[serde(default)]
    pub lot_size: Option<f64>,
    #[serde(default)]
    pub listing_url: Option<String>,
    #[serde(default)]
    pub mls_number: Option<String>,
    #[serde(default)]
    pub property_id: Option<String>,
}

pub const MAX_LOAN_TERM_YEARS: u32 = 50;
pub const MAX_HOLDING_PERIOD_YEARS: u32 = 100;

fn require_text(field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn require_non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        Err(ValidationError::new(field, "must be a finite number"))
    } else if value < 0.0 {
        Err(ValidationError::new(field, "must not be negative"))
    } else {
        Ok(value)
    }
}

fn require_count(field: &'static str, value: i64) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| {
        if value < 0 {
            ValidationError::new(field, "must not be negative")
        } else {
            ValidationError::new(field, "is too large")
        }
    })
}

impl PropertyInput {
    pub fn validate(self) -> Result<Property, ValidationError> {
        let purchase_price = require_non_negative("purchase_price", self.purchase_price)?;
        if purchase_price == 0.0 {
            return Err(ValidationError::new("purchase_price", "must be greater than zero"));
        }

        let lot_size = self.lot_size
            .map(|size| require_non_negative("lot_size", size))
            .transpose()?;

        Ok(Property {
            address: require_text("address", self.address)?,
            city: require_text("city", self.city)?,
            state: require_text("state", self.state)?,
            zip_code: require_text("zip_code", self.zip_code)?,
            purchase_price,
            property_type: self.property_type,
            bedrooms: require_count("bedrooms", self.bedrooms)?,
            bathrooms: require_non_negative("bathrooms", self.bathrooms)?,
            square_feet: require_count("square_feet", self.square_feet)?,
            year_built: self.year_built,
            lot_size,
            listing_url: self.listing_url.filter(|url| !url.trim().is_empty()),
            mls_number: self.mls_number.filter(|mls| !mls.trim().is_empty()),
            property_id: self.property_id.filter(|id| !id.trim().is_empty()),
            created_at: None,
            updated_at: None,
        })
    }
}

impl FinancialAssumptions {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let amounts = [
            ("down_payment_percentage", self.down_payment_percentage),
            ("interest_rate", self.interest_rate),
            ("closing_costs_percentage", self.closing_costs_percentage),
            ("monthly_rent", self.monthly_rent),
            ("vacancy_rate", self.vacancy_rate),
            ("other_monthly_income", self.other_monthly_income),
            ("property_tax_annual", self.property_tax_annual),
            ("insurance_annual", self.insurance_annual),
            ("hoa_monthly", self.hoa_monthly),
            ("maintenance_percentage", self.maintenance_percentage),
            ("property_management_percentage", self.property_management_percentage),
            ("utilities_monthly", self.utilities_monthly),
            ("appreciation_rate", self.appreciation_rate),
        ];
        for (field, value) in amounts {
            require_non_negative(field, value)?;
        }

        let percentages = [
            ("down_payment_percentage", self.down_payment_percentage),
            ("interest_rate", self.interest_rate),
            ("closing_costs_percentage", self.closing_costs_percentage),
            ("vacancy_rate", self.vacancy_rate),
            ("maintenance_percentage", self.maintenance_percentage),
            ("property_management_percentage", self.property_management_percentage),
            ("appreciation_rate", self.appreciation_rate),
        ];
        for (field, value) in percentages {
            if value > 100.0 {
                return Err(ValidationError::new(field, "must not exceed 100"));
            }
        }

        if self.loan_term_years == 0 {
            return Err(ValidationError::new("loan_term_years", "must be at least 1"));
        }
        if self.loan_term_years > MAX_LOAN_TERM_YEARS {
            return Err(ValidationError::new(
                "loan_term_years",
                format!("must not exceed {}", MAX_LOAN_TERM_YEARS),
            ));
        }
        if self.holding_period_years > MAX_HOLDING_PERIOD_YEARS {
            return Err(ValidationError::new(
                "holding_period_years",
                format!("must not exceed {}", MAX_HOLDING_PERIOD_YEARS),
            ));
        }
        Ok(())
    }
}

impl PropertyAnalysis {
    /// False when a computation overflowed, e.g. an extreme price compounded
    /// over the holding period. Such an analysis cannot be serialized or stored.
    pub fn is_finite(&self) -> bool {
        [
            self.purchase_price,
            self.down_payment,
            self.loan_amount,
            self.closing_costs,
            self.total_cash_needed,
            self.monthly_rental_income,
            self.monthly_expenses,
            self.monthly_mortgage_payment,
            self.monthly_cash_flow,
            self.annual_cash_flow,
            self.annual_roi,
            self.cash_on_cash_return,
            self.cap_rate,
            self.total_profit,
            self.total_equity,
        ]
        .iter()
        .chain(self.irr.iter())
        .all(|value| value.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> PropertyInput {
        PropertyInput {
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
        }
    }

    #[test]
    fn assumption_defaults() {
        let assumptions = FinancialAssumptions::default();
        assert_eq!(assumptions.down_payment_percentage, 20.0);
        assert_eq!(assumptions.interest_rate, 7.0);
        assert_eq!(assumptions.loan_term_years, 30);
        assert_eq!(assumptions.vacancy_rate, 5.0);
        assert_eq!(assumptions.holding_period_years, 5);
    }

    #[test]
    fn partial_assumptions_fill_in_defaults() {
        let assumptions: FinancialAssumptions =
            serde_json::from_str(r#"{"monthly_rent": 3000, "interest_rate": 6.5}"#).unwrap();
        assert_eq!(assumptions.monthly_rent, 3000.0);
        assert_eq!(assumptions.interest_rate, 6.5);
        assert_eq!(assumptions.closing_costs_percentage, 3.0);
        assert_eq!(assumptions.maintenance_percentage, 10.0);
    }

    #[test]
    fn valid_input_becomes_property() {
        let property = sample_input().validate().unwrap();
        assert_eq!(property.address, "123 Main St");
        assert_eq!(property.purchase_price, 500_000.0);
        assert_eq!(property.bedrooms, 3);
        assert!(property.property_id.is_none());
    }

    #[test]
    fn rejects_zero_price_and_negative_counts() {
        let mut input = sample_input();
        input.purchase_price = 0.0;
        assert_eq!(input.validate().unwrap_err().field, "purchase_price");

        let mut input = sample_input();
        input.bedrooms = -1;
        assert_eq!(input.validate().unwrap_err().field, "bedrooms");

        let mut input = sample_input();
        input.city = "   ".to_string();
        assert_eq!(input.validate().unwrap_err().field, "city");
    }

    #[test]
    fn rejects_bad_assumptions() {
        let assumptions = FinancialAssumptions { loan_term_years: 0, ..Default::default() };
        assert_eq!(assumptions.validate().unwrap_err().field, "loan_term_years");

        let assumptions = FinancialAssumptions { vacancy_rate: -5.0, ..Default::default() };
        assert_eq!(assumptions.validate().unwrap_err().field, "vacancy_rate");

        let assumptions = FinancialAssumptions { monthly_rent: f64::NAN, ..Default::default() };
        assert_eq!(assumptions.validate().unwrap_err().field, "monthly_rent");
    }

    #[test]
    fn rejects_out_of_range_assumptions() {
        let assumptions = FinancialAssumptions { loan_term_years: 100_000_000, ..Default::default() };
        let err = assumptions.validate().unwrap_err();
        assert_eq!(err.field, "loan_term_years");
        assert_eq!(err.reason, "must not exceed 50");

        let assumptions = FinancialAssumptions { holding_period_years: 1_000, ..Default::default() };
        assert_eq!(assumptions.validate().unwrap_err().field, "holding_period_years");

        let assumptions = FinancialAssumptions { appreciation_rate: 1e300, ..Default::default() };
        assert_eq!(assumptions.validate().unwrap_err().field, "appreciation_rate");

        let assumptions = FinancialAssumptions { interest_rate: 250.0, ..Default::default() };
        assert_eq!(assumptions.validate().unwrap_err().field, "interest_rate");

        let assumptions = FinancialAssumptions {
            loan_term_years: MAX_LOAN_TERM_YEARS,
            holding_period_years: MAX_HOLDING_PERIOD_YEARS,
            appreciation_rate: 100.0,
            ..Default::default()
        };
        assert!(assumptions.validate().is_ok());
    }

    #[test]
    fn property_type_uses_snake_case() {
        let json = serde_json::to_string(&PropertyType::MultiFamily).unwrap();
        assert_eq!(json, "\"multi_family\"");
        assert!(serde_json::from_str::<PropertyType>("\"castle\"").is_err());
    }
}
