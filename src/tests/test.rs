pub use crate::*;

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::clustering::{run_clustering, run_elbow, is_non_increasing};
    use crate::config::AnalyticsConfig;
    use crate::explorer::{
        compute_statistics, describe_table, explore, export_page, list_datasets, numeric_columns,
        sample_table, ExplorerRequest,
    };
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};
    use statrs::statistics::Statistics;

    const PLAYERS: usize = 137;
    const TEAMS: [&str; 4] = ["Boston Red Sox", "Cincinnati Reds", "New York Yankees", "Chicago Cubs"];

    /// Batting table: war drawn from a normal distribution, hr missing on every tenth row.
    fn players(n: usize) -> Vec<Row> {
        let mut rng = StdRng::seed_from_u64(42);
        let war = Normal::new(2.0, 1.5).unwrap();

        (0..n)
            .map(|i| {
                let hr = if i % 10 == 0 { Scalar::Null } else { Scalar::Int((i % 40) as i64) };
                Row::from_pairs([
                    ("name", Scalar::from(format!("Player {}", i))),
                    ("war", Scalar::Float(war.sample(&mut rng))),
                    ("hr", hr),
                    ("team", Scalar::from(TEAMS[i % TEAMS.len()])),
                    ("id", Scalar::Int(i as i64)),
                    ("debut", Scalar::from(format!("20{:02}-04-01", i % 24))),
                ])
            })
            .collect()
    }

    /// Pitching table with smoothly varying features.
    fn pitchers(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let x = i as f64 / 10.0;
                Row::from_pairs([
                    ("pitcher", Scalar::from(format!("Pitcher {}", i))),
                    ("era", Scalar::Float(x)),
                    ("ip", Scalar::Float(x.sqrt() * 3.0)),
                ])
            })
            .collect()
    }

    fn store() -> MemoryStore {
        MemoryStore::new()
            .with_table(
                "staging_war_bat",
                vec!["name", "war", "hr", "team", "id", "debut"],
                players(PLAYERS),
            )
            .with_table("staging_war_pitch", vec!["pitcher", "era", "ip"], pitchers(200))
            .with_table(
                "dw_roster_composition",
                vec!["team", "position"],
                vec![
                    Row::from_pairs([("team", Scalar::from("BOS")), ("position", Scalar::from("C"))]),
                    Row::from_pairs([("team", Scalar::from("NYY")), ("position", Scalar::from("SS"))]),
                ],
            )
            .with_table(
                "staging_five",
                vec!["label", "v"],
                (1..=5)
                    .map(|v| Row::from_pairs([("label", Scalar::from(format!("r{}", v))), ("v", Scalar::Int(v))]))
                    .collect(),
            )
            .with_table("audit_log", vec!["entry"], vec![Row::from_pairs([("entry", Scalar::from("x"))])])
    }

    fn request(table: &str) -> ExplorerRequest {
        ExplorerRequest {
            table: table.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_page_lengths() {
        let store = store();
        for limit in [7u64, 50, 200] {
            let config = AnalyticsConfig {
                page_limit: limit,
                ..Default::default()
            };
            for page in 0..6i64 {
                let result = explore(&store, &config, &ExplorerRequest { page, ..request("staging_war_bat") })
                    .await
                    .unwrap();
                let total = result.total_matching;
                let offset = page as u64 * limit;
                let expected = if offset < total { limit.min(total - offset) } else { 0 };
                assert_eq!(result.rows.len() as u64, expected, "limit={} page={}", limit, page);
                assert_eq!(result.pagination.total_pages, total.div_ceil(limit));
            }
        }
    }

    #[tokio::test]
    async fn test_no_matches_has_no_pages() {
        let store = store();
        let config = AnalyticsConfig::default();
        let result = explore(
            &store,
            &config,
            &ExplorerRequest {
                search: Some("no such player".into()),
                ..request("staging_war_bat")
            },
        )
        .await
        .unwrap();
        assert_eq!(result.total_matching, 0);
        assert_eq!(result.pagination.total_pages, 0);
        assert!(!result.pagination.has_next);
        assert!(result.rows.is_empty());
    }

    #[tokio::test]
    async fn test_search_rows_contain_term() {
        let store = store();
        let config = AnalyticsConfig {
            page_limit: 500,
            ..Default::default()
        };

        let mut previous = u64::MAX;
        for term in ["re", "RED", "red sox", "boston red sox"] {
            let result = explore(
                &store,
                &config,
                &ExplorerRequest {
                    search: Some(term.into()),
                    ..request("staging_war_bat")
                },
            )
            .await
            .unwrap();

            let needle = term.to_lowercase();
            for row in &result.rows {
                assert!(
                    row.values()
                        .filter_map(Scalar::to_text)
                        .any(|v| v.to_lowercase().contains(&needle)),
                    "row {:?} does not contain {}",
                    row,
                    term
                );
            }
            assert!(result.total_matching <= previous);
            assert!(result.total_matching > 0);
            previous = result.total_matching;
        }
    }

    #[tokio::test]
    async fn test_sort_descending() {
        let store = store();
        let config = AnalyticsConfig::default();
        let result = explore(
            &store,
            &config,
            &ExplorerRequest {
                sort: Some("war".into()),
                direction: SortDirection::Descending,
                ..request("staging_war_bat")
            },
        )
        .await
        .unwrap();

        let war: Vec<f64> = result.rows.iter().filter_map(|r| r.numeric("war")).collect();
        assert_eq!(war.len(), 50);
        assert!(war.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_statistics_on_known_values() {
        let store = store();
        let config = AnalyticsConfig::default();
        let descriptor = describe_table(&store, &config, "staging_five").await.unwrap();
        let numeric = numeric_columns(&store, &descriptor).await.unwrap();
        assert_eq!(numeric.len(), 1);

        let stats = compute_statistics(&store, &descriptor.name, &numeric).await;
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 5);
        assert_eq!(stats[0].min, 1.0);
        assert_eq!(stats[0].max, 5.0);
        assert_eq!(stats[0].mean, 3.0);

        // Too few observations to be displayed on the page.
        let page = explore(&store, &config, &request("staging_five")).await.unwrap();
        assert!(page.statistics.is_empty());
    }

    #[tokio::test]
    async fn test_page_statistics_exclude_text_and_dates() {
        let store = store();
        let page = explore(&store, &AnalyticsConfig::default(), &request("staging_war_bat"))
            .await
            .unwrap();

        let columns: Vec<&str> = page.statistics.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(columns, vec!["war", "hr", "id"]);

        let war: Vec<f64> = players(PLAYERS).iter().filter_map(|r| r.numeric("war")).collect();
        let stat = &page.statistics[0];
        assert!((stat.mean - war.iter().mean()).abs() < 1e-9);
        assert!((stat.stddev - war.iter().population_std_dev()).abs() < 1e-9);

        let hr = &page.statistics[1];
        assert_eq!(hr.count, (PLAYERS - PLAYERS.div_ceil(10)) as u64);
    }

    #[tokio::test]
    async fn test_clustering_balance() {
        let store = store();
        let config = AnalyticsConfig::default();

        for k in 2..=10i64 {
            let result = run_clustering(&store, &config, Some("staging_war_bat"), k).await.unwrap();
            let n = result.data_count;
            let k = k as usize;
            assert_eq!(n, PLAYERS);
            assert_eq!(result.clusters.len(), k);
            assert_eq!(result.clusters.iter().map(|c| c.size).sum::<usize>(), n);
            for cluster in &result.clusters {
                assert!(cluster.size == n / k || cluster.size == n.div_ceil(k));
                assert!(cluster.samples.len() <= CLUSTER_SAMPLE_ROWS);
            }
            let shares: f64 = result.clusters.iter().map(|c| c.share_percent).sum();
            assert!((shares - 100.0).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_clustering_uses_first_three_numeric_features() {
        let store = store();
        let result = run_clustering(&store, &AnalyticsConfig::default(), Some("staging_war_bat"), 3)
            .await
            .unwrap();
        assert_eq!(result.features_used, vec!["war", "hr", "id"]);

        let primary: Vec<f64> = result.clusters.iter().filter_map(|c| c.centroid_of("war")).collect();
        assert!(primary.windows(2).all(|w| w[0] < w[1]));
        assert!(result.clusters.iter().all(|c| c.centroid_of("hr").is_some()));
    }

    #[tokio::test]
    async fn test_clustering_sample_is_capped_to_smallest_primary_values() {
        let rows: Vec<Row> = (0..1200)
            .rev()
            .map(|i| {
                Row::from_pairs([
                    ("name", Scalar::from(format!("Player {}", i))),
                    ("war", Scalar::Int(i)),
                ])
            })
            .collect();
        let store = MemoryStore::new().with_table("staging_war_bat", vec!["name", "war"], rows);

        let result = run_clustering(&store, &AnalyticsConfig::default(), Some("staging_war_bat"), 4)
            .await
            .unwrap();

        assert_eq!(result.data_count, CLUSTER_SAMPLE_CAP as usize);
        let sizes: Vec<usize> = result.clusters.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![125, 125, 125, 125]);
        assert_eq!(sizes.iter().sum::<usize>(), 500);

        // Bins cover war = 0..=499, in order.
        let centroids: Vec<f64> = result.clusters.iter().filter_map(|c| c.centroid_of("war")).collect();
        assert_eq!(centroids, vec![62.0, 187.0, 312.0, 437.0]);
        assert_eq!(result.clusters[0].samples[0].numeric("war"), Some(0.0));
        assert!(result
            .clusters
            .iter()
            .flat_map(|c| &c.samples)
            .all(|row| row.numeric("war").is_some_and(|w| w < 500.0)));
    }

    #[tokio::test]
    async fn test_k_is_clamped() {
        let store = store();
        let config = AnalyticsConfig::default();

        let low = run_clustering(&store, &config, Some("staging_war_bat"), 1).await.unwrap();
        assert_eq!(low.k, 2);
        assert_eq!(low.clusters.len(), 2);

        let high = run_clustering(&store, &config, Some("staging_war_bat"), 15).await.unwrap();
        assert_eq!(high.k, 10);
        assert_eq!(high.clusters.len(), 10);
    }

    #[tokio::test]
    async fn test_elbow_is_non_increasing() {
        let store = store();
        let report = run_elbow(&store, &AnalyticsConfig::default(), Some("staging_war_pitch"))
            .await
            .unwrap();

        assert_eq!(report.features_used, vec!["era", "ip"]);
        assert_eq!(report.data_count, 200);
        let ks: Vec<usize> = report.points.iter().map(|p| p.k).collect();
        assert_eq!(ks, (2..=8).collect::<Vec<_>>());
        assert!(is_non_increasing(&report.points));
        assert!(report.points[1..].iter().all(|p| p.reduction_percent.unwrap() > 0.0));
    }

    #[tokio::test]
    async fn test_table_outside_allow_list_uses_default() {
        let store = store();
        let result = run_clustering(&store, &AnalyticsConfig::default(), Some("staging_five"), 3)
            .await
            .unwrap();
        assert_eq!(result.table, "staging_war_bat");

        let result = run_clustering(&store, &AnalyticsConfig::default(), None, 3).await.unwrap();
        assert_eq!(result.table, "staging_war_bat");
    }

    #[tokio::test]
    async fn test_no_numeric_features() {
        let store = store();
        let err = run_clustering(&store, &AnalyticsConfig::default(), Some("dw_roster_composition"), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoNumericFeatures(_)));
        assert_eq!(err.status_code(), 422);
    }

    #[tokio::test]
    async fn test_identifier_guard() {
        let store = store();
        let config = AnalyticsConfig::default();

        for bad in ["students; DROP TABLE x", "col-name", ""] {
            let err = explore(&store, &config, &request(bad)).await.unwrap_err();
            assert!(matches!(err, Error::InvalidIdentifier(_)), "{:?}", bad);
        }
        assert!(Identifier::parse("staging_people").is_ok());

        let err = explore(&store, &config, &request("staging_people")).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));

        // Present in the store but outside the dataset namespace.
        let err = explore(&store, &config, &request("audit_log")).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
    }

    #[tokio::test]
    async fn test_export_round_trip() {
        let rows = vec![
            Row::from_pairs([
                ("a", Scalar::Int(1)),
                ("b", Scalar::from("Ortiz, David")),
                ("c", Scalar::Float(2.5)),
                ("d", Scalar::from("said \"hi\"")),
            ]),
            Row::from_pairs([
                ("a", Scalar::Int(2)),
                ("b", Scalar::from("Ramirez")),
                ("c", Scalar::Null),
                ("d", Scalar::from("plain")),
            ]),
            Row::from_pairs([
                ("a", Scalar::Int(3)),
                ("b", Scalar::from("Varitek")),
                ("c", Scalar::Float(-1.0)),
                ("d", Scalar::from("")),
            ]),
        ];
        let store = MemoryStore::new().with_table("staging_export", vec!["a", "b", "c", "d"], rows.clone());

        let (filename, bytes) = export_page(&store, &AnalyticsConfig::default(), &request("staging_export"))
            .await
            .unwrap();
        assert_eq!(filename, "staging_export_export.csv");

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        for (record, row) in records.iter().zip(&rows) {
            assert_eq!(record.len(), 4);
            let expected: Vec<String> = row.values().map(|v| v.to_text().unwrap_or_default()).collect();
            assert_eq!(record.iter().collect::<Vec<_>>(), expected);
        }
    }

    #[tokio::test]
    async fn test_dataset_listing() {
        let datasets = list_datasets(&store(), &AnalyticsConfig::default()).await.unwrap();
        let names: Vec<&str> = datasets.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["dw_roster_composition", "staging_five", "staging_war_bat", "staging_war_pitch"]
        );
        assert_eq!(datasets[0].display_name, "DW: Roster Composition");
        assert_eq!(datasets[2].row_count, PLAYERS as u64);
    }

    #[tokio::test]
    async fn test_sample_limit_is_clamped() {
        let store = store();
        let config = AnalyticsConfig::default();

        let sample = sample_table(&store, &config, "staging_war_bat", Some(500)).await.unwrap();
        assert_eq!(sample.limit, 100);
        assert_eq!(sample.rows.len(), 100);
        assert_eq!(sample.total_rows, PLAYERS as u64);

        let sample = sample_table(&store, &config, "staging_war_bat", Some(0)).await.unwrap();
        assert_eq!(sample.rows.len(), 1);

        let sample = sample_table(&store, &config, "staging_war_bat", None).await.unwrap();
        assert_eq!(sample.rows.len(), DEFAULT_SAMPLE_LIMIT as usize);
    }
}
