//! Unit Tests for the cluster balance statistics
//!
//! These tests build small clusters with known placement and load and check every statistic
//! against hand-computed values, including the non-obvious policies (capacity-scaled variance,
//! mirrored balance bands, alive-broker denominators and unweighted topic averages).

use super::*;
use crate::cluster::TopicPartition;
use crate::model::{BrokerSpec, ClusterModel, ReplicaSpec};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// Three brokers with capacity 100, broker 3 dead. Brokers 1 and 2 carry 40 and 60 CPU.
fn three_broker_cluster() -> ClusterModel {
    let mut model = ClusterModel::new();
    for id in 1..=3 {
        model
            .add_broker(BrokerSpec::new(id, format!("host-{}", id)).with_uniform_capacity(100.0))
            .unwrap();
    }
    model
        .add_replica(
            ReplicaSpec::new("orders", 0, 1)
                .leader()
                .with_load(Resource::Cpu, 40.0),
        )
        .unwrap();
    model
        .add_replica(
            ReplicaSpec::new("orders", 1, 2)
                .leader()
                .with_load(Resource::Cpu, 60.0),
        )
        .unwrap();
    model.set_broker_alive(3, false).unwrap();
    model
}

/// **Test:** End-to-End Resource Utilization Scenario
///
/// **Reason:** Exercises the full balance band policy on a cluster with a dead broker: the
/// average fraction uses the capacity of every broker, the absolute average uses alive brokers
/// only, and the deviation is measured against each broker's capacity-scaled share.
///
/// **Expectation:** avg fraction 100/300, band [0.267, 0.4]; broker 1 (0.4) sits on the upper
/// edge and is balanced, broker 2 (0.6) is not. Average 50, max 60, min 40 and standard deviation
/// sqrt(((40 − 33.3)² + (60 − 33.3)²) / 2) ≈ 19.44.
#[test]
fn test_end_to_end_resource_scenario() {
    let model = three_broker_cluster();
    let constraint = BalancingConstraint::default().with_balance_percentage(Resource::Cpu, 1.2);

    let stats = ClusterBalanceStats::populate(&model, &constraint).unwrap();

    assert_eq!(stats.num_brokers(), 3);
    assert_eq!(stats.num_alive_brokers(), 2);
    assert_eq!(stats.num_balanced_brokers_by_resource()[&Resource::Cpu], 1);
    assert_close(stats.resource_stat(Statistic::Avg, Resource::Cpu), 50.0);
    assert_close(stats.resource_stat(Statistic::Max, Resource::Cpu), 60.0);
    assert_close(stats.resource_stat(Statistic::Min, Resource::Cpu), 40.0);

    let expected_share: f64 = 100.0 / 300.0 * 100.0;
    let expected_st_dev =
        (((40.0 - expected_share).powi(2) + (60.0 - expected_share).powi(2)) / 2.0_f64).sqrt();
    assert_close(
        stats.resource_stat(Statistic::StDev, Resource::Cpu),
        expected_st_dev,
    );
    assert!((expected_st_dev - 19.4365).abs() < 1e-3);
}

#[test]
fn test_balanced_counts_never_exceed_alive_brokers() {
    let model = three_broker_cluster();
    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();

    assert_eq!(
        stats.num_balanced_brokers_by_resource().len(),
        Resource::cached_values().len()
    );
    for (resource, &balanced) in stats.num_balanced_brokers_by_resource() {
        assert!(
            balanced <= stats.num_alive_brokers(),
            "{} has {} balanced brokers",
            resource,
            balanced
        );
    }
    // Idle resources: every alive broker sits at the (zero) average
    assert_eq!(stats.num_balanced_brokers_by_resource()[&Resource::Disk], 2);
}

/// **Test:** Average Equals Cluster Load over Alive Brokers
///
/// **Reason:** The average is defined as the cluster-wide expected load divided by the alive
/// broker count, including load still attributed to dead brokers.
///
/// **Expectation:** With 30 disk load stranded on dead broker 3, the disk average is
/// (10 + 20 + 30) / 2 = 30.
#[test]
fn test_average_uses_cluster_load() {
    let mut model = three_broker_cluster();
    model
        .add_replica(ReplicaSpec::new("audit", 0, 1).with_load(Resource::Disk, 10.0))
        .unwrap();
    model
        .add_replica(ReplicaSpec::new("audit", 1, 2).with_load(Resource::Disk, 20.0))
        .unwrap();
    model
        .add_replica(ReplicaSpec::new("audit", 2, 3).with_load(Resource::Disk, 30.0))
        .unwrap();

    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();

    assert_close(
        stats.resource_stat(Statistic::Avg, Resource::Disk),
        model.expected_utilization(Resource::Disk) / 2.0,
    );
    assert_close(stats.resource_stat(Statistic::Avg, Resource::Disk), 30.0);
}

#[test]
fn test_identical_brokers_have_zero_deviation() {
    let mut model = ClusterModel::new();
    for id in 1..=4 {
        model
            .add_broker(BrokerSpec::new(id, format!("host-{}", id)).with_uniform_capacity(200.0))
            .unwrap();
        model
            .add_replica(
                ReplicaSpec::new("orders", id as u32, id)
                    .leader()
                    .with_load(Resource::Cpu, 25.0)
                    .with_load(Resource::NetworkOutbound, 50.0),
            )
            .unwrap();
    }

    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();

    for &resource in Resource::cached_values() {
        let st_dev = stats.resource_stat(Statistic::StDev, resource);
        assert!(st_dev >= 0.0);
        assert_close(st_dev, 0.0);
        assert_eq!(stats.num_balanced_brokers_by_resource()[&resource], 4);
    }
    assert_close(stats.potential_nw_out_utilization_stats()[&Statistic::StDev], 0.0);
    assert_eq!(stats.num_brokers_under_potential_nw_out(), 4);
}

/// **Test:** Replica Average over Alive Brokers with Replicas on a Dead Broker
///
/// **Reason:** The replica total counts every broker while the average divides by alive brokers,
/// so average × alive brokers equals the total, which is larger than what alive brokers hold.
/// This asymmetry is intentional and must not be "fixed".
///
/// **Expectation:** Alive brokers hold 1 replica each, dead broker 3 holds 2. The average is
/// 4 / 2 = 2, not the 1 replica each alive broker actually holds.
#[test]
fn test_replica_average_includes_dead_broker_replicas() {
    let mut model = three_broker_cluster();
    model
        .add_replica(ReplicaSpec::new("orders", 0, 3))
        .unwrap();
    model
        .add_replica(ReplicaSpec::new("orders", 1, 3))
        .unwrap();

    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();
    let replica_stats = stats.replica_stats();

    assert_eq!(stats.num_replicas_in_cluster(), 4);
    assert_eq!(replica_stats[&Statistic::Avg], StatValue::Real(2.0));
    assert_eq!(replica_stats[&Statistic::Max], StatValue::Int(2));
    assert_eq!(replica_stats[&Statistic::Min], StatValue::Int(1));
    // both alive brokers deviate by 1 from the inflated average
    assert_eq!(replica_stats[&Statistic::StDev], StatValue::Real(1.0));

    let alive_replicas = 2.0;
    assert_ne!(
        replica_stats[&Statistic::Avg].as_f64() * stats.num_alive_brokers() as f64,
        alive_replicas
    );

    let leader_stats = stats.leader_replica_stats();
    assert_eq!(leader_stats[&Statistic::Avg], StatValue::Real(1.0));
    assert_eq!(leader_stats[&Statistic::Min], StatValue::Int(0));
    assert_eq!(leader_stats[&Statistic::StDev], StatValue::Real(0.0));
}

/// **Test:** Offline Partitions Are Counted Once
///
/// **Reason:** Several replicas of one partition can need self-healing at the same time; the
/// count is about partitions, not replicas.
///
/// **Expectation:** Partition orders-0 has two offline replicas and orders-1 one replica on the
/// dead broker: two partitions in total.
#[test]
fn test_offline_partitions_are_deduplicated() {
    let mut model = three_broker_cluster();
    model
        .add_replica(ReplicaSpec::new("orders", 0, 2).offline())
        .unwrap();
    model
        .set_replica_offline(&TopicPartition::new("orders", 0), 1)
        .unwrap();
    model
        .add_replica(ReplicaSpec::new("orders", 1, 3))
        .unwrap();

    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();

    assert_eq!(model.self_healing_eligible_replicas().len(), 3);
    assert_eq!(stats.num_partitions_with_offline_replicas(), 2);
}

#[test]
fn test_topic_replica_stats_are_unweighted() {
    let mut model = three_broker_cluster();
    for partition in 0..4 {
        model
            .add_replica(ReplicaSpec::new("clicks", partition, 1).leader())
            .unwrap();
        model
            .add_replica(ReplicaSpec::new("clicks", partition, 2))
            .unwrap();
    }

    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();
    let topic_stats = stats.topic_replica_stats();

    // clicks: 8 replicas / 2 = 4, orders: 2 replicas / 2 = 1
    assert_eq!(stats.num_topics(), 2);
    assert_eq!(topic_stats[&Statistic::Avg], StatValue::Real(2.5));
    assert_eq!(topic_stats[&Statistic::Max], StatValue::Int(4));
    // the dead broker holds no replica of either topic
    assert_eq!(topic_stats[&Statistic::Min], StatValue::Int(0));
    assert_eq!(topic_stats[&Statistic::StDev], StatValue::Real(0.0));
}

#[test]
fn test_no_alive_brokers_is_rejected() {
    let mut model = ClusterModel::new();
    model
        .add_broker(BrokerSpec::new(1, "host-1").with_uniform_capacity(10.0).dead())
        .unwrap();

    let result = ClusterBalanceStats::populate(&model, &BalancingConstraint::default());
    assert!(matches!(result, Err(StatsError::NoAliveBrokers)));
}

#[test]
fn test_missing_capacity_fails_populate() {
    let mut model = ClusterModel::new();
    model
        .add_broker(BrokerSpec::new(1, "host-1").with_capacity(Resource::Cpu, 10.0))
        .unwrap();

    let result = ClusterBalanceStats::populate(&model, &BalancingConstraint::default());
    assert!(matches!(result, Err(StatsError::MissingCapacity { .. })));
}

#[test]
fn test_scalars_copied_from_model() {
    let mut model = three_broker_cluster();
    model.set_monitored_partitions_ratio(0.95).unwrap();
    model.set_num_snapshot_windows(5);

    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();

    assert_eq!(stats.num_snapshot_windows(), 5);
    assert_close(stats.monitored_partitions_ratio(), 0.95);
    assert_close(stats.monitored_partitions_percentage(), 95.0);
    assert!(Arc::ptr_eq(
        stats.utilization_matrix(),
        &model.utilization_matrix()
    ));
    assert_eq!(stats.utilization_matrix().broker_ids, vec![1, 2]);
    assert_eq!(stats.utilization_matrix().get(1, Resource::Cpu), Some(60.0));
}

#[test]
fn test_stats_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClusterBalanceStats>();
}

#[test]
fn test_json_structure() {
    let model = three_broker_cluster();
    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();

    let json = stats.to_json_structure();
    assert_eq!(json[METADATA][BROKERS], 3);
    assert_eq!(json[METADATA][REPLICAS], 2);
    assert_eq!(json[METADATA][TOPICS], 1);

    let avg = &json[STATISTICS]["AVG"];
    assert_eq!(avg["cpu"], 50.0);
    assert_eq!(avg[REPLICAS], 1.0);
    assert_eq!(avg[LEADER_REPLICAS], 1.0);
    assert_eq!(avg[TOPIC_REPLICAS], 1.0);
    assert_eq!(json[STATISTICS]["MAX"]["cpu"], 60.0);
    assert_eq!(json[STATISTICS]["MIN"][REPLICAS], 0);
    assert!(json[STATISTICS]["STD"][POTENTIAL_NW_OUT].is_number());

    let reparsed: serde_json::Value = serde_json::from_str(&stats.to_json_string()).unwrap();
    assert_eq!(reparsed[METADATA], json[METADATA]);
    assert_eq!(reparsed[STATISTICS]["MAX"]["cpu"], 60.0);
}

#[test]
fn test_text_rendering() {
    let model = three_broker_cluster();
    let stats = ClusterBalanceStats::populate(&model, &BalancingConstraint::default()).unwrap();

    assert_eq!(stats.to_string_counts(), "3 brokers 2 replicas 1 topics.");

    let rendered = stats.to_string();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("AVG:{CPU:      50.000 NW_IN:"));
    assert!(lines[0].ends_with("replicas:1.0 leaderReplicas:1.0 topicReplicas:1.0}"));
    assert!(lines[1].starts_with("MAX:{CPU:      60.000 "));
    assert!(lines[1].contains("replicas:1 "));
    assert!(lines[2].starts_with("MIN:{"));
    assert!(lines[3].starts_with("STD:{"));
    assert!(lines.iter().all(|line| line.ends_with('}')));
    assert!(!rendered.ends_with('\n'));
}
