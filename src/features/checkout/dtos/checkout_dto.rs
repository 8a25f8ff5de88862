use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::checkout::models::OrderStatus;
use crate::shared::validation::{not_blank, PLAN_REGEX};

/// Request DTO for starting a purchase. Price and credits are looked up from
/// the plan; any other fields in the body are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateCheckoutDto {
    #[validate(regex(path = *PLAN_REGEX, message = "must be a lowercase plan identifier"))]
    pub plan: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSessionDto {
    pub order_no: String,
    pub session_id: String,
    /// Hosted checkout page to redirect the browser to
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ConfirmCheckoutDto {
    #[validate(
        length(max = 255, message = "must be at most 255 characters"),
        custom(function = "not_blank", message = "must not be blank")
    )]
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmationDto {
    pub order_no: String,
    pub status: OrderStatus,
    /// Credits added by this call; 0 when unpaid or already settled
    pub credits_granted: i32,
    pub credits: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_validation() {
        let dto = |plan: &str| CreateCheckoutDto {
            plan: plan.to_string(),
        };
        assert!(dto("basic-plan").validate().is_ok());
        assert!(dto("pro").validate().is_ok());

        let errors = dto("Pro!").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("plan"));
    }

    #[test]
    fn test_client_price_fields_are_dropped() {
        let dto: CreateCheckoutDto = serde_json::from_str(
            r#"{"plan":"pro","amount":50,"currency":"usd","credits":100000}"#,
        )
        .unwrap();
        assert_eq!(dto.plan, "pro");
        assert_eq!(serde_json::to_value(&dto).unwrap(), serde_json::json!({"plan": "pro"}));
    }
}
