//! Tests for participants and share splitting.

use super::*;
use crate::charge::Cadence;

fn charge(amount: i64) -> RecurringCharge {
    RecurringCharge::new(
        "group-1",
        "Rent",
        amount,
        "USD",
        Cadence::Monthly { day: 1 },
        Utc::now(),
    )
    .unwrap()
}

#[test]
fn test_preferred_channel_prefers_sms() {
    let p = Participant::new(Uuid::new_v4(), "Ana", Share::Percent(5000))
        .with_phone("+15550001111")
        .with_email("ana@example.com");
    assert_eq!(p.preferred_channel(), Some(ChannelKind::Sms));
}

#[test]
fn test_preferred_channel_falls_back_on_invalid_phone() {
    let mut p = Participant::new(Uuid::new_v4(), "Ana", Share::Percent(5000))
        .with_phone("+15550001111")
        .with_email("ana@example.com");
    p.phone.as_mut().unwrap().valid = false;
    assert_eq!(p.preferred_channel(), Some(ChannelKind::Email));

    p.email.as_mut().unwrap().valid = false;
    assert_eq!(p.preferred_channel(), None);
}

#[test]
fn test_contact_address_hides_invalid() {
    let mut p = Participant::new(Uuid::new_v4(), "Ben", Share::Fixed(100))
        .with_email("ben@example.com");
    assert_eq!(p.contact_address(ChannelKind::Email), Some("ben@example.com"));
    assert_eq!(p.contact_address(ChannelKind::Sms), None);

    p.email.as_mut().unwrap().valid = false;
    assert_eq!(p.contact_address(ChannelKind::Email), None);
}

#[test]
fn test_validate_opt_in_requires_contact() {
    let mut p = Participant::new(Uuid::new_v4(), "Cam", Share::Fixed(100));
    p.sms_opt_in = true;
    assert!(matches!(
        p.validate(),
        Err(ValidationError::MissingContact(_))
    ));
}

#[test]
fn test_effective_shares_even_percent_split() {
    let charge = charge(10_000);
    let a = Participant::new(charge.id, "A", Share::Percent(5000)).with_designated_payer(true);
    let b = Participant::new(charge.id, "B", Share::Percent(5000));

    let shares = effective_shares(&charge, &[a.clone(), b.clone()]).unwrap();
    assert_eq!(shares, vec![(a.id, 5000), (b.id, 5000)]);
}

#[test]
fn test_effective_shares_remainder_goes_to_payer() {
    // 101 split 50/50 truncates to 50 + 50; the payer picks up the odd unit.
    let charge = charge(101);
    let a = Participant::new(charge.id, "A", Share::Percent(5000)).with_designated_payer(true);
    let b = Participant::new(charge.id, "B", Share::Percent(5000));

    let shares = effective_shares(&charge, &[a.clone(), b.clone()]).unwrap();
    let total: i64 = shares.iter().map(|(_, v)| v).sum();
    assert_eq!(total, 101);
    assert_eq!(shares[0], (a.id, 51));
    assert_eq!(shares[1], (b.id, 50));
}

#[test]
fn test_effective_shares_three_way_truncation() {
    let charge = charge(1000);
    let a = Participant::new(charge.id, "A", Share::Percent(3333)).with_designated_payer(true);
    let b = Participant::new(charge.id, "B", Share::Percent(3333));
    let c = Participant::new(charge.id, "C", Share::Percent(3334));

    let shares = effective_shares(&charge, &[a, b, c]).unwrap();
    let total: i64 = shares.iter().map(|(_, v)| v).sum();
    assert_eq!(total, 1000);
}

#[test]
fn test_effective_shares_mixed_fixed_and_percent() {
    let charge = charge(10_000);
    let a = Participant::new(charge.id, "A", Share::Fixed(4000)).with_designated_payer(true);
    let b = Participant::new(charge.id, "B", Share::Percent(6000));

    let shares = effective_shares(&charge, &[a.clone(), b.clone()]).unwrap();
    assert_eq!(shares, vec![(a.id, 4000), (b.id, 6000)]);
}

#[test]
fn test_effective_shares_rejects_overshoot() {
    let charge = charge(100);
    let a = Participant::new(charge.id, "A", Share::Fixed(80)).with_designated_payer(true);
    let b = Participant::new(charge.id, "B", Share::Fixed(30));

    assert!(matches!(
        effective_shares(&charge, &[a, b]),
        Err(ValidationError::SharesExceedTotal(10))
    ));
}

#[test]
fn test_effective_shares_rejects_large_undershoot() {
    let charge = charge(100);
    let a = Participant::new(charge.id, "A", Share::Fixed(40)).with_designated_payer(true);
    let b = Participant::new(charge.id, "B", Share::Fixed(40));

    assert!(matches!(
        effective_shares(&charge, &[a, b]),
        Err(ValidationError::SharesShortOfTotal(20))
    ));
}

#[test]
fn test_effective_shares_requires_one_payer() {
    let charge = charge(100);
    let a = Participant::new(charge.id, "A", Share::Fixed(50));
    let b = Participant::new(charge.id, "B", Share::Fixed(50));
    assert!(matches!(
        effective_shares(&charge, &[a.clone(), b.clone()]),
        Err(ValidationError::DesignatedPayerCount(0))
    ));

    let a = a.with_designated_payer(true);
    let b = b.with_designated_payer(true);
    assert!(matches!(
        effective_shares(&charge, &[a, b]),
        Err(ValidationError::DesignatedPayerCount(2))
    ));
}

#[test]
fn test_effective_shares_rejects_foreign_participant() {
    let charge = charge(100);
    let a = Participant::new(charge.id, "A", Share::Fixed(100)).with_designated_payer(true);
    let stray = Participant::new(Uuid::new_v4(), "S", Share::Fixed(0));

    assert!(matches!(
        effective_shares(&charge, &[a, stray]),
        Err(ValidationError::UnknownParticipant(_))
    ));
}
