//! Analysis service
//!
//! Reads one graph's records, derives and filters its edge list, renders the
//! network and ranks recommendations. Nothing is cached between calls.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::data::{AccountRecord, Database};
use crate::error::AppError;
use crate::graph::{
    Account, Edge, FilterMode, Layout, Relation, SocialGraph, build_edges, compute_layout,
    filter_edges, major_accounts, rank_combined, rank_recommendations, render_network,
};
use crate::metrics;
use crate::storage::{PlotId, PlotStore};

/// Parameters of one analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub graph: String,
    pub relation: Relation,
    pub mode: FilterMode,
    pub layout: Layout,
}

/// Result of [`AnalysisService::analyze`]
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub graph: String,
    pub recommendations: Vec<(String, usize)>,
    pub plot_id: PlotId,
    pub node_count: usize,
    pub edge_count: usize,
}

impl AnalysisReport {
    /// Recommended names joined for display
    pub fn recommendation_line(&self) -> String {
        join_names(self.recommendations.iter().map(|(name, _)| name.as_str()))
    }
}

/// Result of [`AnalysisService::similar`]
#[derive(Debug, Clone)]
pub struct SimilarReport {
    pub graph: String,
    pub weight: f64,
    pub recommendations: Vec<(String, f64)>,
}

impl SimilarReport {
    pub fn recommendation_line(&self) -> String {
        join_names(self.recommendations.iter().map(|(name, _)| name.as_str()))
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Analysis service
pub struct AnalysisService {
    db: Arc<Database>,
    plots: Arc<PlotStore>,
    threshold: usize,
}

impl AnalysisService {
    /// Create new analysis service
    pub fn new(db: Arc<Database>, plots: Arc<PlotStore>, threshold: usize) -> Self {
        Self {
            db,
            plots,
            threshold,
        }
    }

    /// Build, filter, render and rank one graph.
    ///
    /// Layout and rendering run on the blocking pool.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, AppError> {
        let started = Instant::now();
        let accounts = self.load_accounts(&request.graph).await?;
        let account_count = accounts.len();

        let title = format!("{} ({})", request.graph, request.relation);
        let (relation, mode, layout) = (request.relation, request.mode, request.layout);
        let threshold = self.threshold;
        let rendered = tokio::task::spawn_blocking(move || {
            render_analysis(&accounts, relation, mode, layout, threshold, &title)
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

        let plot_id = self.plots.save(&rendered.html).await?;

        metrics::ANALYSES_TOTAL
            .with_label_values(&[relation.as_str(), mode.as_str(), layout.as_str()])
            .inc();
        metrics::ANALYSIS_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());

        tracing::info!(
            graph = %request.graph,
            relation = %relation,
            mode = %mode,
            layout = %layout,
            accounts = account_count,
            nodes = rendered.node_count,
            edges = rendered.edge_count,
            recommendations = rendered.recommendations.len(),
            plot_id = %plot_id,
            "Graph analyzed"
        );

        Ok(AnalysisReport {
            graph: request.graph.clone(),
            recommendations: rendered.recommendations,
            plot_id,
            node_count: rendered.node_count,
            edge_count: rendered.edge_count,
        })
    }

    /// Rank accounts across both relations at once.
    ///
    /// Both edge lists go through the same filter; following-derived degree
    /// is multiplied by `weight`.
    pub async fn similar(
        &self,
        graph_name: &str,
        mode: FilterMode,
        weight: f64,
    ) -> Result<SimilarReport, AppError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(AppError::Validation(format!(
                "weight must be a non-negative number, got {weight}"
            )));
        }

        let accounts = self.load_accounts(graph_name).await?;
        let threshold = self.threshold;
        let recommendations = tokio::task::spawn_blocking(move || {
            let major = major_accounts(&accounts);
            let following_edges =
                filtered_edges(&accounts, &major, Relation::Following, mode, threshold);
            let follower_edges =
                filtered_edges(&accounts, &major, Relation::Followers, mode, threshold);
            let following = SocialGraph::from_edges(&following_edges);
            let followers = SocialGraph::from_edges(&follower_edges);
            rank_combined(&following, &followers, &major, weight)
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

        tracing::info!(
            graph = graph_name,
            mode = %mode,
            weight,
            recommendations = recommendations.len(),
            "Similar accounts ranked"
        );

        Ok(SimilarReport {
            graph: graph_name.to_string(),
            weight,
            recommendations,
        })
    }

    async fn load_accounts(&self, graph: &str) -> Result<Vec<Account>, AppError> {
        let records = self.db.list_graph_records(graph).await?;
        Ok(records.iter().map(AccountRecord::to_account).collect())
    }
}

/// Output of the CPU-bound part of an analysis
struct Rendered {
    html: String,
    recommendations: Vec<(String, usize)>,
    node_count: usize,
    edge_count: usize,
}

fn render_analysis(
    accounts: &[Account],
    relation: Relation,
    mode: FilterMode,
    layout: Layout,
    threshold: usize,
    title: &str,
) -> Rendered {
    let major = major_accounts(accounts);
    let edges = filtered_edges(accounts, &major, relation, mode, threshold);
    let graph = SocialGraph::from_edges(&edges);

    let positions = compute_layout(&graph, layout);
    Rendered {
        html: render_network(&graph, &positions, &major, title),
        recommendations: rank_recommendations(&graph, &major),
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
    }
}

fn filtered_edges(
    accounts: &[Account],
    major: &HashSet<String>,
    relation: Relation,
    mode: FilterMode,
    threshold: usize,
) -> Vec<Edge> {
    let edges = build_edges(accounts, relation);
    filter_edges(&edges, major, mode, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DEFAULT_THRESHOLD;
    use tempfile::TempDir;

    async fn service(records: &[AccountRecord]) -> (AnalysisService, Arc<PlotStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::connect(&temp_dir.path().join("analysis.db"))
            .await
            .unwrap();
        for record in records {
            db.insert_record(record).await.unwrap();
        }
        let plots = Arc::new(PlotStore::new(temp_dir.path().join("plots")).await.unwrap());
        let service = AnalysisService::new(Arc::new(db), Arc::clone(&plots), DEFAULT_THRESHOLD);
        (service, plots, temp_dir)
    }

    fn request(relation: Relation, mode: FilterMode) -> AnalysisRequest {
        AnalysisRequest {
            graph: "tech".to_string(),
            relation,
            mode,
            layout: Layout::Circular,
        }
    }

    fn tech_graph() -> Vec<AccountRecord> {
        vec![
            AccountRecord::new("tech", "alice", "x, y", "carol, dave, erin"),
            AccountRecord::new("tech", "bob", "x", "carol, dave"),
            AccountRecord::new("tech", "zed", "y", "carol, frank"),
            AccountRecord::new("other", "mallory", "carol", "carol"),
        ]
    }

    #[tokio::test]
    async fn common_following_recommends_shared_accounts() {
        let (service, plots, _temp_dir) = service(&tech_graph()).await;

        let report = service
            .analyze(&request(Relation::Following, FilterMode::Common))
            .await
            .unwrap();

        // carol: 3 incoming, dave: 2, erin and frank: 1 each.
        assert_eq!(
            report.recommendations,
            vec![("carol".to_string(), 3), ("dave".to_string(), 2)]
        );
        assert_eq!(report.recommendation_line(), "carol, dave");
        assert_eq!(report.node_count, 5);
        assert_eq!(report.edge_count, 5);

        let html = plots.load(&report.plot_id).await.unwrap();
        assert!(html.contains("account: carol"));
        assert!(!html.contains("account: erin"));
    }

    #[tokio::test]
    async fn unique_following_keeps_single_mentions() {
        let (service, _plots, _temp_dir) = service(&tech_graph()).await;

        let report = service
            .analyze(&request(Relation::Following, FilterMode::Unique))
            .await
            .unwrap();

        assert_eq!(
            report.recommendations,
            vec![("erin".to_string(), 1), ("frank".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn each_analysis_gets_its_own_plot() {
        let (service, _plots, _temp_dir) = service(&tech_graph()).await;
        let request = request(Relation::Followers, FilterMode::Common);

        let first = service.analyze(&request).await.unwrap();
        let second = service.analyze(&request).await.unwrap();
        assert_ne!(first.plot_id, second.plot_id);
    }

    #[tokio::test]
    async fn unknown_graph_yields_empty_report() {
        let (service, _plots, _temp_dir) = service(&[]).await;

        let mut request = request(Relation::Followers, FilterMode::Common);
        request.graph = "missing".to_string();
        let report = service.analyze(&request).await.unwrap();

        assert!(report.recommendations.is_empty());
        assert_eq!(report.recommendation_line(), "");
        assert_eq!(report.node_count, 0);
    }

    #[tokio::test]
    async fn similar_combines_both_relations() {
        let (service, _plots, _temp_dir) = service(&tech_graph()).await;

        let report = service.similar("tech", FilterMode::Common, 0.5).await.unwrap();

        // following: carol 3, dave 2; followers: x 2, y 2.
        assert_eq!(
            report.recommendations,
            vec![
                ("x".to_string(), 2.0),
                ("y".to_string(), 2.0),
                ("carol".to_string(), 1.5),
                ("dave".to_string(), 1.0),
            ]
        );
        assert_eq!(report.recommendation_line(), "x, y, carol, dave");
    }

    #[tokio::test]
    async fn similar_rejects_negative_weight() {
        let (service, _plots, _temp_dir) = service(&tech_graph()).await;

        let error = service
            .similar("tech", FilterMode::Common, -1.0)
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn large_layout_does_not_stall_the_runtime() {
        let leaves: Vec<String> = (0..1000).map(|i| format!("leaf{i}")).collect();
        let record = AccountRecord::new("star", "hub", "", leaves.join(", "));
        let (service, _plots, _temp_dir) = service(&[record]).await;
        let request = AnalysisRequest {
            graph: "star".to_string(),
            relation: Relation::Following,
            mode: FilterMode::Unique,
            layout: Layout::Spring,
        };

        let started = Instant::now();
        let (report, ticker_done) = tokio::join!(
            async {
                let report = service.analyze(&request).await.unwrap();
                (report, started.elapsed())
            },
            async {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                started.elapsed()
            }
        );
        let (report, analysis_done) = report;

        assert_eq!(report.node_count, 1001);
        // The single runtime thread stayed free while the layout ran.
        assert!(
            ticker_done < analysis_done,
            "ticker {ticker_done:?} vs analysis {analysis_done:?}"
        );
    }
}
