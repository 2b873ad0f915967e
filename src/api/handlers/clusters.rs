use axum::extract::{Query, State};
use axum::response::Json;
use std::sync::Arc;
use tracing::info;
use crate::clustering::{cluster_form, run_clustering, run_elbow};
use crate::{
    lenient_int, AppState, ClusterAction, ClusterParams, ClusterResponse, Error, DEFAULT_CLUSTERS,
};

pub async fn get_kmeans(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClusterParams>,
) -> Result<Json<ClusterResponse>, Error> {
    let action = ClusterAction::parse(params.action.as_deref());
    let table = params.table.as_deref().filter(|t| !t.is_empty());
    let k = lenient_int("k", params.k.as_deref());
    let store = state.store.as_ref();

    info!("Clustering request - action: {:?}, table: {:?}, k: {:?}", action, table, k);

    let response = match action {
        ClusterAction::Form => ClusterResponse::Form(cluster_form(store, &state.config, table, k).await?),
        ClusterAction::Run => {
            let k = k.unwrap_or(DEFAULT_CLUSTERS as i64);
            ClusterResponse::Run(run_clustering(store, &state.config, table, k).await?)
        }
        ClusterAction::Elbow => ClusterResponse::Elbow(run_elbow(store, &state.config, table).await?),
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::{MemoryStore, Row, Scalar};

    fn state() -> Arc<AppState> {
        let rows = (0..30)
            .map(|i| {
                Row::from_pairs([
                    ("player", Scalar::from(format!("player {}", i))),
                    ("war", Scalar::Float(i as f64 * 0.25)),
                ])
            })
            .collect();
        let store = MemoryStore::new().with_table("staging_war_bat", vec!["player", "war"], rows);
        Arc::new(AppState::new(Arc::new(store), AnalyticsConfig::default()))
    }

    #[tokio::test]
    async fn test_form_lists_existing_allowed_tables() {
        let Json(response) = get_kmeans(State(state()), Query(ClusterParams::default())).await.unwrap();
        match response {
            ClusterResponse::Form(form) => {
                assert_eq!(form.tables, vec!["staging_war_bat".to_string()]);
                assert_eq!(form.selected_table, "staging_war_bat");
                assert_eq!(form.k, DEFAULT_CLUSTERS);
            }
            _ => panic!("expected the form"),
        }
    }

    #[tokio::test]
    async fn test_run_with_unparseable_k_uses_default() {
        let params = ClusterParams {
            table: Some("staging_war_bat".into()),
            k: Some("many".into()),
            action: Some("run".into()),
        };
        let Json(response) = get_kmeans(State(state()), Query(params)).await.unwrap();
        match response {
            ClusterResponse::Run(result) => {
                assert_eq!(result.k, DEFAULT_CLUSTERS);
                assert_eq!(result.clusters.len(), 3);
                assert_eq!(result.features_used, vec!["war".to_string()]);
                assert_eq!(result.data_count, 30);
            }
            _ => panic!("expected a clustering result"),
        }
    }

    #[tokio::test]
    async fn test_elbow_serializes_with_action_tag() {
        let params = ClusterParams {
            action: Some("elbow".into()),
            ..Default::default()
        };
        let Json(response) = get_kmeans(State(state()), Query(params)).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["action"], "elbow");
        assert_eq!(json["points"].as_array().unwrap().len(), 7);
    }
}
