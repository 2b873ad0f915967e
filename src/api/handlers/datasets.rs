use axum::{
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::info;
use crate::explorer::{explore, export_page, html_table, list_datasets, sample_table, TableSample, CSV_CONTENT_TYPE};
use crate::{lenient_int, AppState, DatasetsResponse, Error, ExplorerParams, SampleParams};

pub async fn get_datasets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DatasetsResponse>, Error> {
    let datasets = list_datasets(state.store.as_ref(), &state.config).await?;
    info!("Listing {} datasets", datasets.len());
    Ok(Json(DatasetsResponse { datasets }))
}

/// Explorer page as JSON, an HTML table fragment, or a CSV attachment of the current page.
pub async fn get_dataset_view(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExplorerParams>,
) -> Result<Response, Error> {
    let request = params.to_request();
    info!(
        "Explorer request - table: {}, search: {:?}, sort: {:?}, page: {}",
        request.table, request.search, request.sort, request.page
    );

    if params.wants_csv() {
        let (filename, bytes) = export_page(state.store.as_ref(), &state.config, &request).await?;
        let headers = [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ];
        return Ok((headers, bytes).into_response());
    }

    let page = explore(state.store.as_ref(), &state.config, &request).await?;
    if params.wants_html() {
        Ok(Html(html_table(&page.display_name, &page.columns, &page.rows)).into_response())
    } else {
        Ok(Json(page).into_response())
    }
}

pub async fn get_dataset_sample(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SampleParams>,
) -> Result<Json<TableSample>, Error> {
    let table = params.table.unwrap_or_default();
    let limit = lenient_int("limit", params.limit.as_deref());
    let sample = sample_table(state.store.as_ref(), &state.config, &table, limit).await?;
    Ok(Json(sample))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::config::AnalyticsConfig;
    use crate::{MemoryStore, Row, Scalar};

    fn state() -> Arc<AppState> {
        let rows = (1..=3)
            .map(|i| Row::from_pairs([("id", Scalar::Int(i)), ("name", Scalar::from(format!("p{}", i)))]))
            .collect();
        let store = MemoryStore::new().with_table("staging_people", vec!["id", "name"], rows);
        Arc::new(AppState::new(Arc::new(store), AnalyticsConfig::default()))
    }

    fn params(table: &str) -> ExplorerParams {
        ExplorerParams {
            table: Some(table.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_csv_export_is_an_attachment() {
        let mut query = params("staging_people");
        query.export = Some("csv".into());
        let response = get_dataset_view(State(state()), Query(query)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert_eq!(
            disposition.to_str().unwrap(),
            "attachment; filename=\"staging_people_export.csv\""
        );
    }

    #[tokio::test]
    async fn test_invalid_table_is_rejected() {
        let err = get_dataset_view(State(state()), Query(params("people; DROP TABLE x")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let err = get_dataset_view(State(state()), Query(params("staging_missing")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_sample_with_garbage_limit_uses_default() {
        let query = SampleParams {
            table: Some("staging_people".into()),
            limit: Some("lots".into()),
        };
        let Json(sample) = get_dataset_sample(State(state()), Query(query)).await.unwrap();
        assert_eq!(sample.limit, 10);
        assert_eq!(sample.total_rows, 3);
        assert_eq!(sample.rows.len(), 3);
    }
}
