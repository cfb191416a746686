use crate::cpd::{CpdError, WrongColumnSum};

use super::*;

fn variable(name: &str, cardinality: usize) -> Variable {
    Variable::new(name, cardinality)
}

/// Sprinkler-style fragment: Cloudy → Rain, Cloudy → Sprinkler, {Sprinkler, Rain} → Wet.
fn sprinkler_builder() -> NetworkBuilder {
    let mut builder = Network::builder();
    for name in ["Cloudy", "Sprinkler", "Rain", "Wet"] {
        builder.add_variable(name, 2).unwrap();
    }
    builder.add_edge("Cloudy", "Sprinkler").unwrap();
    builder.add_edge("Cloudy", "Rain").unwrap();
    builder.add_edge("Sprinkler", "Wet").unwrap();
    builder.add_edge("Rain", "Wet").unwrap();
    builder
}

fn add_sprinkler_cpds(builder: &mut NetworkBuilder, skip: Option<&str>) {
    let cpds = [
        TabularCpd::root(variable("Cloudy", 2), vec![0.5, 0.5]).unwrap(),
        TabularCpd::new(
            variable("Sprinkler", 2),
            vec![variable("Cloudy", 2)],
            vec![vec![0.5, 0.9], vec![0.5, 0.1]],
        )
        .unwrap(),
        TabularCpd::new(
            variable("Rain", 2),
            vec![variable("Cloudy", 2)],
            vec![vec![0.8, 0.2], vec![0.2, 0.8]],
        )
        .unwrap(),
        TabularCpd::new(
            variable("Wet", 2),
            vec![variable("Sprinkler", 2), variable("Rain", 2)],
            vec![vec![1.0, 0.1, 0.1, 0.01], vec![0.0, 0.9, 0.9, 0.99]],
        )
        .unwrap(),
    ];
    for cpd in cpds {
        if Some(cpd.variable().name.as_str()) != skip {
            builder.add_cpd(cpd).unwrap();
        }
    }
}

#[test]
fn build_valid() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, None);
    let network = builder.build().unwrap();

    assert_eq!(4, network.variables().len());
    assert_eq!(vec![0], network.roots().collect::<Vec<_>>());
    assert_eq!(&[1, 2], network.parents(3));
    assert_eq!(&[0, 1, 2, 3], network.topological_order());
    assert!(network.is_root(0));
    assert!(!network.is_root(3));
    assert_eq!(4, network.cpd(3).cols());

    let factors = network.factors();
    assert_eq!(4, factors.len());
    assert_eq!(&[3, 1, 2], factors[3].scope());
}

#[test]
fn network_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Network>();
}

#[test]
fn duplicate_variable() {
    let mut builder = Network::builder();
    builder.add_variable("Rain", 2).unwrap();
    assert_eq!(
        ModelError::DuplicateVariable("Rain".into()),
        builder.add_variable("Rain", 3).unwrap_err()
    );
}

#[test]
fn zero_cardinality() {
    assert_eq!(
        "variable Rain has no states",
        Network::builder().add_variable("Rain", 0).unwrap_err().to_string()
    );
}

#[test]
fn edge_to_unknown_variable() {
    let mut builder = sprinkler_builder();
    assert_eq!(
        ModelError::UnknownVariable("Umbrella".into()),
        builder.add_edge("Rain", "Umbrella").unwrap_err()
    );
}

#[test]
fn self_loop() {
    let mut builder = sprinkler_builder();
    assert_eq!(
        ModelError::SelfLoop("Rain".into()),
        builder.add_edge("Rain", "Rain").unwrap_err()
    );
}

#[test]
fn duplicate_edge() {
    let mut builder = sprinkler_builder();
    assert_eq!(
        "duplicate edge Rain -> Wet",
        builder.add_edge("Rain", "Wet").unwrap_err().to_string()
    );
}

#[test]
fn duplicate_cpd() {
    let mut builder = sprinkler_builder();
    builder
        .add_cpd(TabularCpd::root(variable("Cloudy", 2), vec![0.5, 0.5]).unwrap())
        .unwrap();
    assert_eq!(
        ModelError::DuplicateCpd("Cloudy".into()),
        builder
            .add_cpd(TabularCpd::root(variable("Cloudy", 2), vec![0.4, 0.6]).unwrap())
            .unwrap_err()
    );
}

#[test]
fn missing_cpd() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, Some("Rain"));
    assert_eq!(ModelError::MissingCpd("Rain".into()), builder.build().unwrap_err());
}

#[test]
fn cpd_for_unknown_variable() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, None);
    builder
        .add_cpd(TabularCpd::root(variable("Umbrella", 2), vec![0.5, 0.5]).unwrap())
        .unwrap();
    assert_eq!(ModelError::UnknownVariable("Umbrella".into()), builder.build().unwrap_err());
}

#[test]
fn parent_order_mismatch() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, Some("Wet"));
    builder
        .add_cpd(
            TabularCpd::new(
                variable("Wet", 2),
                vec![variable("Rain", 2), variable("Sprinkler", 2)],
                vec![vec![1.0, 0.1, 0.1, 0.01], vec![0.0, 0.9, 0.9, 0.99]],
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(
        "CPD for Wet is conditioned on [\"Rain\", \"Sprinkler\"], but the declared parents are [\"Sprinkler\", \"Rain\"]",
        builder.build().unwrap_err().to_string()
    );
}

#[test]
fn missing_parent_in_cpd() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, Some("Wet"));
    builder
        .add_cpd(
            TabularCpd::new(
                variable("Wet", 2),
                vec![variable("Rain", 2)],
                vec![vec![0.9, 0.1], vec![0.1, 0.9]],
            )
            .unwrap(),
        )
        .unwrap();
    assert!(matches!(
        builder.build().unwrap_err(),
        ModelError::ParentMismatch { .. }
    ));
}

#[test]
fn parent_cardinality_mismatch() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, Some("Rain"));
    builder
        .add_cpd(
            TabularCpd::new(
                variable("Rain", 2),
                vec![variable("Cloudy", 3)],
                vec![vec![0.8, 0.2, 0.5], vec![0.2, 0.8, 0.5]],
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(
        ModelError::CardinalityMismatch {
            cpd_of: "Rain".into(),
            variable: "Cloudy".into(),
            declared: 2,
            cpd: 3
        },
        builder.build().unwrap_err()
    );
}

#[test]
fn own_cardinality_mismatch() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, Some("Cloudy"));
    builder
        .add_cpd(TabularCpd::root(variable("Cloudy", 3), vec![0.2, 0.3, 0.5]).unwrap())
        .unwrap();
    assert_eq!(
        "CPD for Cloudy assumes Cloudy has 3 states, but it is declared with 2",
        builder.build().unwrap_err().to_string()
    );
}

#[test]
fn column_does_not_sum_to_one() {
    let mut builder = sprinkler_builder();
    add_sprinkler_cpds(&mut builder, Some("Sprinkler"));
    builder
        .add_cpd(
            TabularCpd::new(
                variable("Sprinkler", 2),
                vec![variable("Cloudy", 2)],
                vec![vec![0.5, 0.9], vec![0.5, 0.2]],
            )
            .unwrap(),
        )
        .unwrap();
    let err = builder.build().unwrap_err();
    let ModelError::InvalidCpd(CpdError::WrongColumnSum(WrongColumnSum {
        variable,
        column,
        actual,
        ..
    })) = err
    else {
        panic!("unexpected {err:?}");
    };
    assert_eq!("Sprinkler", variable);
    assert_eq!(1, column);
    assert!((actual - 1.1).abs() < 1e-9);
}

#[test]
fn looser_tolerance_accepts_rounded_columns() {
    let mut builder = Network::builder().with_tolerance(1e-2);
    builder.add_variable("Rain", 2).unwrap();
    builder
        .add_cpd(TabularCpd::root(variable("Rain", 2), vec![0.333, 0.666]).unwrap())
        .unwrap();
    builder.build().unwrap();
}

#[test]
fn cycle() {
    let mut builder = Network::builder();
    for name in ["A", "B", "C", "D"] {
        builder.add_variable(name, 2).unwrap();
    }
    builder.add_edge("A", "B").unwrap();
    builder.add_edge("B", "C").unwrap();
    builder.add_edge("C", "D").unwrap();
    builder.add_edge("D", "B").unwrap();
    let binary = |name: &str, parent: &str| {
        TabularCpd::new(
            variable(name, 2),
            vec![variable(parent, 2)],
            vec![vec![0.5, 0.5], vec![0.5, 0.5]],
        )
        .unwrap()
    };
    builder.add_cpd(TabularCpd::root(variable("A", 2), vec![0.5, 0.5]).unwrap()).unwrap();
    builder
        .add_cpd(
            TabularCpd::new(
                variable("B", 2),
                vec![variable("A", 2), variable("D", 2)],
                vec![vec![0.5; 4], vec![0.5; 4]],
            )
            .unwrap(),
        )
        .unwrap();
    builder.add_cpd(binary("C", "B")).unwrap();
    builder.add_cpd(binary("D", "C")).unwrap();
    assert_eq!(
        ModelError::Cycle(vec!["B".into(), "C".into(), "D".into()]),
        builder.build().unwrap_err()
    );
}
