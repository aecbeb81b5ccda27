use super::config::RoundingPolicy;
use super::QualificationError;

/// Percentage saved against the worst-case rate, clamped at zero.
pub fn savings_percent(
    actual_rate: f64,
    worst_case_rate: f64,
    rounding: &RoundingPolicy,
) -> Result<f64, QualificationError> {
    ensure_non_negative("actual rate", actual_rate)?;
    ensure_non_negative("worst-case rate", worst_case_rate)?;

    if worst_case_rate == 0.0 || actual_rate >= worst_case_rate {
        return Ok(0.0);
    }

    let percent = (worst_case_rate - actual_rate) / worst_case_rate * 100.0;
    Ok(rounding.percent(percent))
}

/// Currency saved on `transaction_amount`; rates are in percentage points.
pub fn savings_amount(
    transaction_amount: f64,
    actual_rate: f64,
    worst_case_rate: f64,
    rounding: &RoundingPolicy,
) -> Result<f64, QualificationError> {
    ensure_non_negative("transaction amount", transaction_amount)?;
    ensure_non_negative("actual rate", actual_rate)?;
    ensure_non_negative("worst-case rate", worst_case_rate)?;

    let delta = (worst_case_rate - actual_rate).max(0.0);
    Ok(rounding.currency(transaction_amount * delta / 100.0))
}

fn ensure_non_negative(name: &str, value: f64) -> Result<(), QualificationError> {
    if !value.is_finite() {
        return Err(QualificationError::InvalidInput(format!(
            "{name} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(QualificationError::InvalidInput(format!(
            "{name} must not be negative (got {value})"
        )));
    }
    Ok(())
}
