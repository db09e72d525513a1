//! The membership plans offered on the landing page.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::tier::MembershipTier;

/// One plan card: pricing plus the feature bullets shown under it.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipPlan {
    pub tier: MembershipTier,
    pub price: Decimal,
    pub period: &'static str,
    pub features: &'static [&'static str],
    /// Visually emphasized on the landing page.
    pub highlighted: bool,
}

impl MembershipPlan {
    pub fn name(&self) -> &'static str {
        self.tier.label()
    }

    /// Price as shown on the card, e.g. `$11.88`.
    pub fn price_display(&self) -> String {
        format!("${}", self.price)
    }

    pub fn for_tier(tier: MembershipTier) -> MembershipPlan {
        match tier {
            MembershipTier::FreeJawn => MembershipPlan {
                tier,
                price: dec!(0),
                period: "/month",
                features: &[
                    "View upcoming events",
                    "Basic profile",
                    "Limited community access",
                    "No early access",
                    "No discounts",
                ],
                highlighted: false,
            },
            MembershipTier::Tribe => MembershipPlan {
                tier,
                price: dec!(22.44),
                period: "/month",
                features: &[
                    "Host & create events",
                    "Premium profile badge",
                    "30% off all tickets",
                    "Early access (48h)",
                    "Dedicated support",
                ],
                highlighted: true,
            },
            MembershipTier::PowWow => MembershipPlan {
                tier,
                price: dec!(11.88),
                period: "/month",
                features: &[
                    "Full community access",
                    "Enhanced profile",
                    "15% off all tickets",
                    "Early access (24h)",
                    "Priority support",
                ],
                highlighted: false,
            },
        }
    }
}

/// All plans in landing-page display order (the highlighted plan sits in the
/// middle, not where tier ordering would put it).
pub fn catalog() -> [MembershipPlan; 3] {
    [
        MembershipPlan::for_tier(MembershipTier::FreeJawn),
        MembershipPlan::for_tier(MembershipTier::Tribe),
        MembershipPlan::for_tier(MembershipTier::PowWow),
    ]
}
