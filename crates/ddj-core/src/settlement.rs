//! Settlement Engine (SE) math: pot split, category classification,
//! proration, and carry bookkeeping. Pure integer arithmetic throughout —
//! no floating point ever touches a payout.
//!
//! The surrounding transaction (locking, idempotence, writing rows) lives
//! in `ddj-api::services::settlement_service`; this module only computes
//! the [`SettlementPlan`] given the bets, the drawn outcome, and the carry
//! balance coming into the round.

use std::collections::BTreeMap;

use crate::draw::Outcome;

/// The seven prize categories, in classification priority order. A bet is
/// classified into the *first* category its match counts satisfy.
pub const CATEGORIES: [Category; 7] = [
    Category::Four1,
    Category::Four0,
    Category::Three1,
    Category::Three0,
    Category::Two1,
    Category::Two0,
    Category::One1,
];

/// A prize category: number of main matches plus whether the chance digit
/// also matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// 4 main matches + chance.
    Four1,
    /// 4 main matches, no chance.
    Four0,
    /// 3 main matches + chance.
    Three1,
    /// 3 main matches, no chance.
    Three0,
    /// 2 main matches + chance.
    Two1,
    /// 2 main matches, no chance.
    Two0,
    /// 1 main match + chance.
    One1,
}

impl Category {
    /// Allocation weight out of the category win pool, in basis points out
    /// of 10_000 so the split is exact integer arithmetic (0.35 -> 3500).
    #[must_use]
    pub const fn weight_bps(self) -> u64 {
        match self {
            Self::Four1 => 3500,
            Self::Four0 => 1500,
            Self::Three1 => 1800,
            Self::Three0 => 1000,
            Self::Two1 => 1000,
            Self::Two0 => 700,
            Self::One1 => 500,
        }
    }

    /// Display key used in ledger metadata and API responses.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Four1 => "4+1",
            Self::Four0 => "4+0",
            Self::Three1 => "3+1",
            Self::Three0 => "3+0",
            Self::Two1 => "2+1",
            Self::Two0 => "2+0",
            Self::One1 => "1+1",
        }
    }

    /// Classify a match count pair into a category, if any applies.
    ///
    /// `k` is the number of main-number matches (values >= 4 are treated as
    /// exactly 4, per the spec's tie-break policy); `chance_hit` is whether
    /// the bet's chance digit matched the draw.
    #[must_use]
    pub fn classify(k: u32, chance_hit: bool) -> Option<Self> {
        let k = k.min(4);
        match (k, chance_hit) {
            (4, true) => Some(Self::Four1),
            (4, false) => Some(Self::Four0),
            (3, true) => Some(Self::Three1),
            (3, false) => Some(Self::Three0),
            (2, true) => Some(Self::Two1),
            (2, false) => Some(Self::Two0),
            (1, true) => Some(Self::One1),
            _ => None,
        }
    }
}

const ADMIN_TAKE_BPS: i64 = 2500;
const WIN_POOL_BPS: i64 = 6500;
const BPS_SCALE: i64 = 10_000;

fn floor_bps(amount: i64, bps: i64) -> i64 {
    (amount * bps) / BPS_SCALE
}

/// One bet as seen by the settlement engine. Generic over a player-key
/// type `P` (the service layer's database identifier) so this module never
/// has to know what a player ID actually looks like.
#[derive(Debug, Clone)]
pub struct SettlementBet<P> {
    /// Opaque identifier the caller uses to map results back to a bet row.
    pub bet_id: P,
    /// Owning player's identifier, used to aggregate winnings per player.
    pub player_id: P,
    /// Stake, in DOS minor units.
    pub amount: i64,
    /// The bet's chosen numbers (already validated: 4..=8 unique, 1..=20).
    pub nums: Vec<u8>,
    /// The bet's chosen chance digit (1..=5).
    pub chance: u8,
}

/// Per-bet settlement outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetOutcome<P> {
    /// The bet this result applies to.
    pub bet_id: P,
    /// Payout credited to the bet (0 for losers).
    pub payout: i64,
    /// Prize category, `None` for losers.
    pub category: Option<Category>,
}

/// The full result of settling one round.
#[derive(Debug, Clone)]
pub struct SettlementPlan<P> {
    /// Total stakes collected for the round.
    pub pot: i64,
    /// Carry balance brought into the round's allocation base.
    pub carry_in: i64,
    /// Floor(pot * 25%), banked to the admin.
    pub admin_take: i64,
    /// Pool available for winners before carry-in is added.
    pub win_pool: i64,
    /// New carry balance to persist for the next round.
    pub carry_out: i64,
    /// Per-bet results, in the same order bets were supplied.
    pub bet_outcomes: Vec<BetOutcome<P>>,
    /// Total credited to each winning player (aggregated across their bets),
    /// in deterministic key order.
    pub player_credits: BTreeMap<P, i64>,
}

/// Compute the settlement plan for a round.
///
/// `carry_in` is the `game_bank.carry_dos` balance read under lock before
/// this call; the caller is responsible for persisting `carry_out` back to
/// that same row in the same transaction.
#[must_use]
pub fn settle<P: Ord + Copy>(
    bets: &[SettlementBet<P>],
    outcome: Outcome,
    carry_in: i64,
) -> SettlementPlan<P> {
    let pot: i64 = bets.iter().map(|b| b.amount).sum();
    let admin_take = floor_bps(pot, ADMIN_TAKE_BPS);
    let win_pool = floor_bps(pot, WIN_POOL_BPS);
    let carry_base_total = pot - admin_take - win_pool;

    let pot_total = win_pool + carry_in;

    let mut by_category: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    let mut categories_of = vec![None; bets.len()];

    for (idx, bet) in bets.iter().enumerate() {
        let k = u32::try_from(
            bet.nums
                .iter()
                .filter(|n| outcome.main.contains(n))
                .count(),
        )
        .unwrap_or(0);
        let chance_hit = bet.chance == outcome.chance;
        if let Some(cat) = Category::classify(k, chance_hit) {
            categories_of[idx] = Some(cat);
            by_category.entry(cat).or_default().push(idx);
        }
    }

    let mut bet_outcomes: Vec<BetOutcome<P>> = bets
        .iter()
        .map(|b| BetOutcome {
            bet_id: b.bet_id,
            payout: 0,
            category: None,
        })
        .collect();
    let mut player_credits: BTreeMap<P, i64> = BTreeMap::new();
    let mut total_paid_out: i64 = 0;

    for cat in CATEGORIES {
        let cat_pool = floor_bps(pot_total, i64::try_from(cat.weight_bps()).unwrap_or(0));
        let Some(winner_idxs) = by_category.get(&cat) else {
            continue;
        };
        let stake_sum: i64 = winner_idxs.iter().map(|&i| bets[i].amount).sum();
        if stake_sum == 0 {
            continue;
        }
        for &idx in winner_idxs {
            let amount = bets[idx].amount;
            let payout = (cat_pool * amount) / stake_sum;
            bet_outcomes[idx].payout = payout;
            bet_outcomes[idx].category = categories_of[idx];
            total_paid_out += payout;
            *player_credits.entry(bets[idx].player_id).or_insert(0) += payout;
        }
    }

    let carry_out = carry_base_total + pot_total - total_paid_out;

    SettlementPlan {
        pot,
        carry_in,
        admin_take,
        win_pool,
        carry_out,
        bet_outcomes,
        player_credits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> Outcome {
        Outcome {
            main: [3, 7, 11, 19],
            chance: 2,
        }
    }

    #[test]
    fn spec_example_five_pot_split() {
        // A: 10 DOS on the winning 4 numbers + matching chance -> "4+1"
        // B: 20 DOS on 3 matches, wrong chance -> "3+0"
        // C: 10 DOS, loser
        let bets = vec![
            SettlementBet {
                bet_id: 1u32,
                player_id: 100u32,
                amount: 10,
                nums: vec![3, 7, 11, 19],
                chance: 2,
            },
            SettlementBet {
                bet_id: 2,
                player_id: 200,
                amount: 20,
                nums: vec![3, 7, 11, 1],
                chance: 5,
            },
            SettlementBet {
                bet_id: 3,
                player_id: 300,
                amount: 10,
                nums: vec![1, 2, 4, 5],
                chance: 4,
            },
        ];

        let plan = settle(&bets, outcome(), 0);

        assert_eq!(plan.pot, 40);
        assert_eq!(plan.admin_take, 10);
        assert_eq!(plan.win_pool, 26);

        let a = plan
            .bet_outcomes
            .iter()
            .find(|o| o.bet_id == 1)
            .unwrap();
        assert_eq!(a.payout, 9);
        assert_eq!(a.category, Some(Category::Four1));

        let b = plan
            .bet_outcomes
            .iter()
            .find(|o| o.bet_id == 2)
            .unwrap();
        assert_eq!(b.payout, 2);
        assert_eq!(b.category, Some(Category::Three0));

        let c = plan
            .bet_outcomes
            .iter()
            .find(|o| o.bet_id == 3)
            .unwrap();
        assert_eq!(c.payout, 0);
        assert_eq!(c.category, None);
    }

    #[test]
    fn conservation_holds_for_arbitrary_bets() {
        let bets = vec![
            SettlementBet {
                bet_id: 1u32,
                player_id: 1u32,
                amount: 37,
                nums: vec![3, 7, 11, 19],
                chance: 2,
            },
            SettlementBet {
                bet_id: 2,
                player_id: 2,
                amount: 53,
                nums: vec![3, 7, 11, 19],
                chance: 2,
            },
            SettlementBet {
                bet_id: 3,
                player_id: 3,
                amount: 19,
                nums: vec![2, 4, 6, 8],
                chance: 1,
            },
        ];
        let carry_in = 17;
        let plan = settle(&bets, outcome(), carry_in);

        let total_paid: i64 = plan.bet_outcomes.iter().map(|o| o.payout).sum();
        assert_eq!(
            plan.admin_take + plan.carry_out + total_paid,
            plan.pot + carry_in
        );
    }

    #[test]
    fn proration_splits_by_stake_within_category() {
        let bets = vec![
            SettlementBet {
                bet_id: 1u32,
                player_id: 1u32,
                amount: 10,
                nums: vec![3, 7, 11, 19],
                chance: 9, // never matches; forces "4+0"
            },
            SettlementBet {
                bet_id: 2,
                player_id: 2,
                amount: 30,
                nums: vec![3, 7, 11, 19],
                chance: 9,
            },
        ];
        let plan = settle(&bets, outcome(), 0);
        let first = plan.bet_outcomes[0].payout;
        let second = plan.bet_outcomes[1].payout;
        // second staked 3x first, so should receive ~3x the payout.
        assert_eq!(second, first * 3);
    }

    #[test]
    fn empty_category_pool_flows_to_carry() {
        // Nobody wins anything.
        let bets = vec![SettlementBet {
            bet_id: 1u32,
            player_id: 1u32,
            amount: 100,
            nums: vec![1, 2, 4, 5],
            chance: 4,
        }];
        let plan = settle(&bets, outcome(), 0);
        let total_paid: i64 = plan.bet_outcomes.iter().map(|o| o.payout).sum();
        assert_eq!(total_paid, 0);
        assert_eq!(plan.admin_take + plan.carry_out, plan.pot);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    /// Arbitrary bet stream plus a drawn outcome and carry-in, shaped so
    /// `settle` always has at least one bet to classify.
    fn bets_outcome_carry_strategy(
    ) -> impl Strategy<Value = (Vec<SettlementBet<u32>>, Outcome, i64)> {
        let bet_strategy = (
            1u32..1000,
            1i64..10_000,
            prop::collection::hash_set(1u8..=20, 4),
            1u8..=5,
        )
            .prop_map(|(player_id, amount, nums_set, chance)| {
                let mut nums: Vec<u8> = nums_set.into_iter().collect();
                nums.sort_unstable();
                SettlementBet {
                    bet_id: player_id,
                    player_id,
                    amount,
                    nums,
                    chance,
                }
            });

        let outcome_strategy = (
            prop::collection::hash_set(1u8..=20, 4),
            1u8..=5,
        )
            .prop_map(|(main_set, chance)| {
                let mut main: Vec<u8> = main_set.into_iter().collect();
                main.sort_unstable();
                Outcome {
                    main: [main[0], main[1], main[2], main[3]],
                    chance,
                }
            });

        (
            prop::collection::vec(bet_strategy, 1..20),
            outcome_strategy,
            0i64..10_000,
        )
    }

    proptest! {
        /// `adminTake + carryOut + sum(payouts) == pot + carryIn` for any
        /// mix of bets, draw outcome, and incoming carry — the spec's §8
        /// "Conservation per round" invariant, checked against arbitrary
        /// inputs rather than the one hand-picked example.
        #[test]
        fn conservation_holds_for_any_bet_mix((bets, outcome, carry_in) in bets_outcome_carry_strategy()) {
            let plan = settle(&bets, outcome, carry_in);
            let total_paid: i64 = plan.bet_outcomes.iter().map(|o| o.payout).sum();
            prop_assert_eq!(plan.admin_take + plan.carry_out + total_paid, plan.pot + carry_in);
        }

        /// No bet is ever credited more than its own category's pool, and
        /// no payout is ever negative -- both would indicate an
        /// integer-arithmetic mistake in the proration step.
        #[test]
        fn payouts_are_never_negative((bets, outcome, carry_in) in bets_outcome_carry_strategy()) {
            let plan = settle(&bets, outcome, carry_in);
            for o in &plan.bet_outcomes {
                prop_assert!(o.payout >= 0);
            }
            prop_assert!(plan.carry_out >= 0);
            prop_assert!(plan.admin_take >= 0);
        }
    }
}
