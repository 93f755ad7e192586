use ledger::{
    Balance, Expense, LedgerError, MemberId, Money, ParticipantInput, Settlement, SplitPolicy,
    aggregate, allocate, minimize,
};
use proptest::prelude::*;

fn member(index: usize) -> MemberId {
    MemberId::new(format!("m{index}"))
}

fn members(count: usize) -> Vec<MemberId> {
    (0..count).map(member).collect()
}

fn apply(balances: &[Balance], suggestions: &[ledger::SettlementSuggestion]) -> Vec<Balance> {
    let mut applied = balances.to_vec();
    for suggestion in suggestions {
        for balance in &mut applied {
            if balance.member_id == suggestion.from {
                balance.net += suggestion.amount;
            }
            if balance.member_id == suggestion.to {
                balance.net -= suggestion.amount;
            }
        }
    }
    applied
}

fn policy_inputs(
    policy: SplitPolicy,
    total: i64,
    weights: &[u32],
) -> Vec<ParticipantInput> {
    match policy {
        SplitPolicy::Equal => (0..weights.len())
            .map(|i| ParticipantInput::unweighted(member(i)))
            .collect(),
        SplitPolicy::Shares => weights
            .iter()
            .enumerate()
            .map(|(i, w)| ParticipantInput::shares(member(i), *w))
            .collect(),
        SplitPolicy::Percentages => {
            // Scale arbitrary weights to integer percents summing to 100.
            let sum: u64 = weights.iter().map(|w| u64::from(*w)).sum::<u64>().max(1);
            let mut percents: Vec<u8> = weights
                .iter()
                .map(|w| (u64::from(*w) * 100 / sum) as u8)
                .collect();
            let assigned: u32 = percents.iter().map(|p| u32::from(*p)).sum();
            percents[0] += (100 - assigned) as u8;
            percents
                .into_iter()
                .enumerate()
                .map(|(i, p)| ParticipantInput::percent(member(i), p))
                .collect()
        }
        SplitPolicy::ExactAmounts => {
            let n = weights.len() as i64;
            let mut parts: Vec<i64> = vec![total / n; weights.len()];
            parts[0] += total % n;
            parts
                .into_iter()
                .enumerate()
                .map(|(i, amount)| ParticipantInput::amount(member(i), Money::new(amount)))
                .collect()
        }
    }
}

fn any_policy() -> impl Strategy<Value = SplitPolicy> {
    prop_oneof![
        Just(SplitPolicy::Equal),
        Just(SplitPolicy::ExactAmounts),
        Just(SplitPolicy::Percentages),
        Just(SplitPolicy::Shares),
    ]
}

proptest! {
    #[test]
    fn allocation_conserves_total(
        policy in any_policy(),
        total in 1i64..=(1i64 << 40),
        weights in prop::collection::vec(1u32..=1_000, 1..=12),
    ) {
        let participants = policy_inputs(policy, total, &weights);
        let split = allocate(Money::new(total), policy, &participants).unwrap();

        prop_assert_eq!(split.lines.len(), participants.len());
        prop_assert_eq!(split.amounts().iter().sum::<Money>(), Money::new(total));
        for (line, input) in split.lines.iter().zip(&participants) {
            prop_assert_eq!(&line.member_id, &input.member_id);
            prop_assert!(!line.owed.is_negative());
        }
    }

    #[test]
    fn allocation_is_deterministic(
        policy in any_policy(),
        total in 1i64..=1_000_000,
        weights in prop::collection::vec(0u32..=50, 1..=8),
    ) {
        let mut weights = weights;
        weights[0] = weights[0].max(1);
        let participants = policy_inputs(policy, total, &weights);
        let first = allocate(Money::new(total), policy, &participants);
        let second = allocate(Money::new(total), policy, &participants);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn weighted_remainder_ignores_input_order(
        total in 1i64..=1_000_000,
        weights in prop::collection::vec(1u32..=50, 2..=8),
    ) {
        let participants = policy_inputs(SplitPolicy::Shares, total, &weights);
        let mut reversed = participants.clone();
        reversed.reverse();

        let forward = allocate(Money::new(total), SplitPolicy::Shares, &participants).unwrap();
        let backward = allocate(Money::new(total), SplitPolicy::Shares, &reversed).unwrap();
        for line in &forward.lines {
            prop_assert_eq!(Some(line.owed), backward.owed_by(line.member_id.as_str()));
        }
    }

    #[test]
    fn balances_sum_to_zero(
        member_count in 1usize..=6,
        expenses in prop::collection::vec(
            (0usize..6, 1i64..=100_000, prop::collection::vec(0usize..6, 1..=6)),
            0..=20,
        ),
        settlements in prop::collection::vec((0usize..6, 0usize..6, 1i64..=10_000), 0..=10),
    ) {
        let members = members(member_count);
        let mut recorded = Vec::new();
        for (payer, total, participants) in expenses {
            let mut inputs: Vec<ParticipantInput> = participants
                .into_iter()
                .map(|i| ParticipantInput::unweighted(member(i % member_count)))
                .collect();
            inputs.sort_by(|a, b| a.member_id.cmp(&b.member_id));
            inputs.dedup_by(|a, b| a.member_id == b.member_id);
            let split = allocate(Money::new(total), SplitPolicy::Equal, &inputs).unwrap();
            recorded.push(Expense::from_split(member(payer % member_count), split));
        }
        let settlements: Vec<Settlement> = settlements
            .into_iter()
            .map(|(from, to, amount)| Settlement {
                from: member(from % member_count),
                to: member(to % member_count),
                amount: Money::new(amount),
            })
            .collect();

        let balances = aggregate(&members, &recorded, &settlements).unwrap();
        prop_assert_eq!(balances.len(), member_count);
        prop_assert_eq!(balances.iter().map(|b| b.net).sum::<Money>(), Money::ZERO);

        let mut reordered = recorded.clone();
        reordered.reverse();
        let mut settlements_reordered = settlements.clone();
        settlements_reordered.reverse();
        prop_assert_eq!(
            aggregate(&members, &reordered, &settlements_reordered).unwrap(),
            balances
        );
    }

    #[test]
    fn suggestions_clear_every_balance(
        nets in prop::collection::vec(-100_000i64..=100_000, 1..=10),
    ) {
        let mut nets = nets;
        let residual: i64 = nets.iter().sum();
        nets.push(-residual);
        let balances: Vec<Balance> = nets
            .iter()
            .enumerate()
            .map(|(i, net)| Balance::new(member(i), Money::new(*net)))
            .collect();

        let suggestions = minimize(&balances).unwrap();

        for balance in apply(&balances, &suggestions) {
            prop_assert!(balance.net.is_zero());
        }
        for suggestion in &suggestions {
            prop_assert!(suggestion.amount.is_positive());
        }
        let parties = nets.iter().filter(|net| **net != 0).count();
        prop_assert!(suggestions.len() <= parties.saturating_sub(1));
        prop_assert_eq!(minimize(&balances).unwrap(), suggestions);
    }
}

#[test]
fn equal_three_way_split_has_one_extra_cent() {
    let participants: Vec<_> = members(3)
        .into_iter()
        .map(ParticipantInput::unweighted)
        .collect();
    let split = allocate(Money::new(100), SplitPolicy::Equal, &participants).unwrap();
    assert_eq!(
        split.amounts(),
        [Money::new(34), Money::new(33), Money::new(33)]
    );
}

#[test]
fn mixing_policies_in_one_call_fails() {
    let participants = [
        ParticipantInput::unweighted("a"),
        ParticipantInput::unweighted("b"),
        ParticipantInput::amount("c", Money::new(10)),
    ];
    let err = allocate(Money::new(100), SplitPolicy::Equal, &participants).unwrap_err();
    assert_eq!(err, LedgerError::MixedPolicy("c".into()));
    assert_eq!(err.code(), "MIXED_POLICY");
}

#[test]
fn dinner_split_then_settle_up() {
    let group: Vec<MemberId> = ["A", "B", "C"].into_iter().map(MemberId::from).collect();
    let participants: Vec<_> = group
        .iter()
        .cloned()
        .map(ParticipantInput::unweighted)
        .collect();

    let split = allocate(Money::new(4500), SplitPolicy::Equal, &participants).unwrap();
    assert_eq!(split.amounts(), [Money::new(1500); 3]);

    let balances = aggregate(&group, &[Expense::from_split("A", split)], &[]).unwrap();
    assert_eq!(
        balances,
        [
            Balance::new("A", Money::new(3000)),
            Balance::new("B", Money::new(-1500)),
            Balance::new("C", Money::new(-1500)),
        ]
    );

    let suggestions = minimize(&balances).unwrap();
    let pairs: Vec<(&str, &str, i64)> = suggestions
        .iter()
        .map(|s| (s.from.as_str(), s.to.as_str(), s.amount.minor()))
        .collect();
    assert_eq!(pairs, [("B", "A", 1500), ("C", "A", 1500)]);

    let settled = aggregate(
        &group,
        &[],
        &suggestions
            .into_iter()
            .map(|s| Settlement {
                from: s.from,
                to: s.to,
                amount: s.amount,
            })
            .collect::<Vec<_>>(),
    )
    .unwrap();
    let combined: Vec<Money> = balances
        .iter()
        .zip(&settled)
        .map(|(before, after)| before.net + after.net)
        .collect();
    assert!(combined.iter().all(|net| net.is_zero()));
}

#[test]
fn core_types_serialize_as_plain_records() {
    let split = allocate(
        Money::new(100),
        SplitPolicy::Shares,
        &[ParticipantInput::shares("a", 1), ParticipantInput::shares("b", 2)],
    )
    .unwrap();
    let json = serde_json::to_value(&split).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "policy": "SHARES",
            "total": 100,
            "lines": [
                { "member_id": "a", "owed": 33 },
                { "member_id": "b", "owed": 67 },
            ],
        })
    );
}
