use crate::domain::models::ProjectionResult;
use crate::errors::ValidationError;

/// Future value of a monthly SIP under annuity-due compounding (each
/// contribution starts compounding the month it is deposited).
///
/// FV = m * ((1 + i)^n - 1) / i * (1 + i), with i the monthly rate and
/// n the total number of months.
pub fn compute_sip(
    monthly_amount: f64,
    years: f64,
    annual_rate_percent: f64,
) -> Result<ProjectionResult, ValidationError> {
    if !(monthly_amount > 0.0) || !(years > 0.0) || !annual_rate_percent.is_finite() {
        return Err(ValidationError::InvalidInput("invalid input".to_string()));
    }

    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let total_months = years * 12.0;
    let total_investment = monthly_amount * total_months;

    // Zero rate makes the annuity formula divide by zero; no growth means
    // the future value is exactly the sum of contributions.
    let future_value = if monthly_rate == 0.0 {
        total_investment
    } else {
        monthly_amount * (((1.0 + monthly_rate).powf(total_months) - 1.0) / monthly_rate)
            * (1.0 + monthly_rate)
    };

    Ok(ProjectionResult::Sip {
        monthly_amount,
        total_investment,
        future_value,
        total_returns: future_value - total_investment,
        duration: years,
        expected_return: annual_rate_percent,
    })
}

/// Future value of a single upfront investment under annual compounding.
pub fn compute_lumpsum(
    principal: f64,
    years: f64,
    annual_rate_percent: f64,
) -> Result<ProjectionResult, ValidationError> {
    if !(principal > 0.0) || !(years > 0.0) || !annual_rate_percent.is_finite() {
        return Err(ValidationError::InvalidInput("invalid input".to_string()));
    }

    let future_value = principal * (1.0 + annual_rate_percent / 100.0).powf(years);

    Ok(ProjectionResult::Lumpsum {
        principal,
        future_value,
        total_returns: future_value - principal,
        duration: years,
        expected_return: annual_rate_percent,
    })
}
