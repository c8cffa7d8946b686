//! HTML pages
//!
//! Pages are plain `format!` templates. Every stored value is escaped before
//! it reaches the markup.

use crate::data::{AccountDetails, Overview};
use crate::graph::{FilterMode, Layout, Relation};
use crate::service::{AnalysisReport, SimilarReport};

const STYLE: &str = r#"
    body { font-family: sans-serif; margin: 2rem; max-width: 60rem; }
    form { margin: 1rem 0; padding: 1rem; border: 1px solid #ccc; }
    label { display: block; margin: 0.25rem 0; }
    iframe { width: 100%; height: 40rem; border: 1px solid #ccc; }
    nav form { display: inline; border: none; padding: 0; }"#;

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{}</title>
  <style>{}</style>
</head>
<body>
  <nav>
    <form method="post" action="/home"><button type="submit">Manage records</button></form>
    <form method="post" action="/explore"><button type="submit">Explore</button></form>
  </nav>
  <h1>{}</h1>
{}
</body>
</html>"#,
        html_escape::encode_text(title),
        STYLE,
        html_escape::encode_text(title),
        body
    )
}

/// `<select>` listing `options` with `selected` preselected.
///
/// A selection missing from `options` (such as the empty marker) is shown
/// as the leading entry.
fn render_select(name: &str, options: &[String], selected: &str) -> String {
    let leading = (!options.iter().any(|option| option == selected))
        .then(|| selected.to_string());
    let items = leading
        .iter()
        .chain(options.iter())
        .map(|option| {
            let marker = if option == selected { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{}>{}</option>",
                html_escape::encode_double_quoted_attribute(option),
                marker,
                html_escape::encode_text(option)
            )
        })
        .collect::<Vec<_>>()
        .join("");

    format!(
        "<select name=\"{}\">{}</select>",
        html_escape::encode_double_quoted_attribute(name),
        items
    )
}

fn render_choice(name: &str, values: &[&str]) -> String {
    let options: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    render_select(name, &options, values.first().copied().unwrap_or_default())
}

/// Record management page
///
/// `selected` overrides the first graph and account shown; `details` adds the
/// stored lists of that account.
pub fn render_add_page(
    overview: &Overview,
    selected: Option<(&str, &str)>,
    details: Option<&AccountDetails>,
) -> String {
    let (graph, account) =
        selected.unwrap_or_else(|| (overview.first_graph(), overview.first_account()));

    let details_block = details
        .map(|details| {
            format!(
                r#"  <section id="details">
    <h2>{} in {}</h2>
    <p><strong>Followers:</strong> <span id="followers">{}</span></p>
    <p><strong>Following:</strong> <span id="following">{}</span></p>
  </section>
"#,
                html_escape::encode_text(account),
                html_escape::encode_text(graph),
                html_escape::encode_text(&details.followers),
                html_escape::encode_text(&details.following)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"{details_block}  <form method="post" action="/account">
    <h2>Look up an account</h2>
    <label>Graph {graphs}</label>
    <label>Account {accounts}</label>
    <button type="submit">Show</button>
  </form>
  <form method="post" action="/graphs/delete">
    <h2>Delete a graph</h2>
    <label>Graph {graphs}</label>
    <button type="submit">Delete graph</button>
  </form>
  <form method="post" action="/accounts/delete">
    <h2>Delete an account</h2>
    <label>Account {accounts}</label>
    <button type="submit">Delete account</button>
  </form>
  <form method="post" action="/accounts">
    <h2>Add an account</h2>
    <label>Graph <input name="graph" required /></label>
    <label>Account <input name="account" required /></label>
    <label>Followers <input name="followers" placeholder="alice, bob" /></label>
    <label>Following <input name="following" placeholder="carol, dave" /></label>
    <button type="submit">Add</button>
  </form>
  <form method="post" action="/upload" enctype="multipart/form-data">
    <h2>Import CSV</h2>
    <p>Four columns, no header: graph, account, followers, following.</p>
    <input type="file" name="file" accept=".csv,text/csv" />
    <button type="submit">Upload</button>
  </form>"#,
        graphs = render_select("graph", &overview.graphs, graph),
        accounts = render_select("account", &overview.accounts, account),
    );

    page("Follow graph", &body)
}

/// Analysis form page
pub fn render_explore_page(overview: &Overview, default_weight: f64) -> String {
    let graphs = render_select("graph", &overview.graphs, overview.first_graph());
    let modes = render_choice(
        "mode",
        &[FilterMode::Common.as_str(), FilterMode::Unique.as_str()],
    );

    let body = format!(
        r#"  <form method="post" action="/analyze">
    <h2>Analyze a graph</h2>
    <label>Graph {graphs}</label>
    <label>Relation {relations}</label>
    <label>Mode {modes}</label>
    <label>Layout {layouts}</label>
    <button type="submit">Analyze</button>
  </form>
  <form method="post" action="/similar">
    <h2>Similar accounts</h2>
    <label>Graph {graphs}</label>
    <label>Mode {modes}</label>
    <label>Following weight <input name="weight" type="number" step="any" min="0" value="{default_weight}" /></label>
    <button type="submit">Rank</button>
  </form>"#,
        relations = render_choice(
            "relation",
            &[Relation::Followers.as_str(), Relation::Following.as_str()],
        ),
        layouts = render_choice(
            "layout",
            &[
                Layout::Circular.as_str(),
                Layout::Spring.as_str(),
                Layout::Spectral.as_str(),
            ],
        ),
    );

    page("Explore", &body)
}

/// Analysis result with the rendered network embedded
pub fn render_result_page(report: &AnalysisReport) -> String {
    let body = format!(
        r#"  <h2 id="graph">{}</h2>
  <p><strong>Recommended accounts:</strong> <span id="recommendations">{}</span></p>
  <p>{} accounts, {} connections</p>
  <iframe src="/plots/{}" title="network"></iframe>"#,
        html_escape::encode_text(&report.graph),
        html_escape::encode_text(&report.recommendation_line()),
        report.node_count,
        report.edge_count,
        report.plot_id
    );

    page("Recommendations", &body)
}

/// Combined ranking result
pub fn render_similar_page(report: &SimilarReport) -> String {
    let rows = report
        .recommendations
        .iter()
        .map(|(name, score)| {
            format!(
                "    <tr><td>{}</td><td>{:.2}</td></tr>",
                html_escape::encode_text(name),
                score
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"  <h2 id="graph">{}</h2>
  <p><strong>Similar accounts:</strong> <span id="recommendations">{}</span></p>
  <p>Following weight {}</p>
  <table>
    <tr><th>Account</th><th>Score</th></tr>
{}
  </table>"#,
        html_escape::encode_text(&report.graph),
        html_escape::encode_text(&report.recommendation_line()),
        report.weight,
        rows
    );

    page("Similar accounts", &body)
}
