//! Charge-or-remind decision of the auto-debit sweep.
//!
//! Only a credential that is on file, active, and marked reusable by the
//! gateway may be charged off-session; every other due plan gets a reminder.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use estatepay::modules::gateways::AuthorizationInfo;
use estatepay::modules::payments::models::{
    BillingFrequency, Installment, InvestmentCategory, StoredPaymentMethod,
};
use estatepay::modules::payments::services::{sweep_action, SweepAction};

fn due_plan(authorization_code: Option<&str>) -> Installment {
    Installment::new(
        "user-1".to_string(),
        "prop-1".to_string(),
        InvestmentCategory::Shares,
        BillingFrequency::Monthly,
        dec!(250000),
        "trx_user-1_1700000000_ab12cd34".to_string(),
        "ada@example.com".to_string(),
        "PLN_abc".to_string(),
        Some("SUB_abc".to_string()),
        authorization_code.map(String::from),
        Some("CUS_abc".to_string()),
        Some(12),
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    )
    .unwrap()
}

fn stored_card(code: &str, reusable: bool) -> StoredPaymentMethod {
    StoredPaymentMethod::from_authorization(
        "user-1",
        &AuthorizationInfo {
            authorization_code: code.to_string(),
            card_type: Some("visa".to_string()),
            last4: Some("4081".to_string()),
            exp_month: Some("12".to_string()),
            exp_year: Some("2030".to_string()),
            bank: Some("Test Bank".to_string()),
            reusable,
            channel: Some("card".to_string()),
        },
    )
}

#[test]
fn reusable_card_on_file_is_charged() {
    let plan = due_plan(Some("AUTH_abc"));
    let card = stored_card("AUTH_abc", true);

    assert_eq!(
        sweep_action(&plan, Some(&card)),
        SweepAction::Charge {
            authorization_code: "AUTH_abc".to_string()
        }
    );
}

#[test]
fn non_reusable_card_gets_a_reminder() {
    let plan = due_plan(Some("AUTH_abc"));
    let card = stored_card("AUTH_abc", false);

    assert_eq!(sweep_action(&plan, Some(&card)), SweepAction::Remind);
}

#[test]
fn card_not_on_file_gets_a_reminder() {
    // The plan carries a code, but no stored method backs it
    let plan = due_plan(Some("AUTH_abc"));

    assert_eq!(sweep_action(&plan, None), SweepAction::Remind);
}

#[test]
fn deactivated_card_gets_a_reminder() {
    let plan = due_plan(Some("AUTH_abc"));
    let mut card = stored_card("AUTH_abc", true);
    card.active = false;

    assert_eq!(sweep_action(&plan, Some(&card)), SweepAction::Remind);
}

#[test]
fn mismatched_stored_code_gets_a_reminder() {
    let plan = due_plan(Some("AUTH_abc"));
    let card = stored_card("AUTH_other", true);

    assert_eq!(sweep_action(&plan, Some(&card)), SweepAction::Remind);
}

#[test]
fn plan_without_authorization_gets_a_reminder() {
    let plan = due_plan(None);
    let card = stored_card("AUTH_abc", true);

    assert_eq!(sweep_action(&plan, Some(&card)), SweepAction::Remind);
    assert_eq!(sweep_action(&plan, None), SweepAction::Remind);
}
