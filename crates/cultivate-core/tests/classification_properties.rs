//! Property tests for status classification and compliance scoring.

use cultivate_core::{
    AlertId, AlertSeverity, ComplianceAlert, ComplianceLevel, ComplianceStatus, ErrorCategory,
    FacilityId,
};
use proptest::prelude::*;

fn severity() -> impl Strategy<Value = AlertSeverity> {
    prop_oneof![
        Just(AlertSeverity::Low),
        Just(AlertSeverity::Medium),
        Just(AlertSeverity::High),
        Just(AlertSeverity::Critical),
    ]
}

proptest! {
    #[test]
    fn every_5xx_and_above_is_server(status in 500u16..=u16::MAX) {
        prop_assert_eq!(ErrorCategory::from_status(status), ErrorCategory::Server);
    }

    #[test]
    fn status_never_classifies_as_network(status in any::<u16>()) {
        prop_assert_ne!(ErrorCategory::from_status(status), ErrorCategory::Network);
    }

    #[test]
    fn unlisted_client_errors_are_generic(status in 402u16..500) {
        prop_assume!(![403, 409, 422].contains(&status));
        prop_assert_eq!(ErrorCategory::from_status(status), ErrorCategory::Generic);
    }

    #[test]
    fn level_never_improves_as_score_drops(a in any::<u8>(), b in any::<u8>()) {
        let rank = |l: ComplianceLevel| match l {
            ComplianceLevel::Compliant => 2,
            ComplianceLevel::Warning => 1,
            _ => 0,
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(ComplianceLevel::from_score(lo)) <= rank(ComplianceLevel::from_score(hi)));
    }

    #[test]
    fn acknowledging_alerts_never_lowers_the_score(
        severities in proptest::collection::vec(severity(), 0..12),
        ack_mask in any::<u16>(),
    ) {
        let facility = FacilityId::new("fac_prop");
        let open: Vec<ComplianceAlert> = severities
            .iter()
            .enumerate()
            .map(|(i, s)| ComplianceAlert {
                id: AlertId::new(format!("a{i}")),
                facility_id: facility.clone(),
                severity: *s,
                title: String::new(),
                description: String::new(),
                created_at: chrono::Utc::now(),
                acknowledged: false,
                acknowledged_at: None,
            })
            .collect();
        let mut partly_acked = open.clone();
        for (i, alert) in partly_acked.iter_mut().enumerate() {
            alert.acknowledged = ack_mask & (1 << i) != 0;
        }
        let before = ComplianceStatus::evaluate(&facility, &open);
        let after = ComplianceStatus::evaluate(&facility, &partly_acked);
        prop_assert!(after.score >= before.score);
        prop_assert!(after.open_alerts <= before.open_alerts);
    }
}
