//! Network visualization as a standalone HTML document with inline SVG

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::{Position, SocialGraph};

pub const MAJOR_NODE_COLOR: &str = "red";
pub const OTHER_NODE_COLOR: &str = "blue";
pub const MAJOR_EDGE_COLOR: &str = "red";
pub const DEFAULT_EDGE_COLOR: &str = "black";

const NODE_RADIUS: f64 = 0.3;
const EDGE_WIDTH: f64 = 0.05;
const VIEW_EXTENT: f64 = 10.1;

/// Render `graph` at `positions`.
///
/// Major accounts are filled with `MAJOR_NODE_COLOR`; an edge between two
/// major accounts is stroked with `MAJOR_EDGE_COLOR`. Hovering a node shows
/// `account: <name>`. The wheel zooms and dragging pans.
pub fn render_network(
    graph: &SocialGraph<'_>,
    positions: &[(&str, Position)],
    major_accounts: &HashSet<String>,
    title: &str,
) -> String {
    let lookup: HashMap<&str, Position> = positions.iter().copied().collect();
    let is_major = |name: &str| major_accounts.contains(name);

    let mut edges_svg = String::new();
    for (a, b) in graph.edges() {
        let (Some(pa), Some(pb)) = (lookup.get(a), lookup.get(b)) else {
            continue;
        };
        let color = if is_major(a) && is_major(b) {
            MAJOR_EDGE_COLOR
        } else {
            DEFAULT_EDGE_COLOR
        };
        let _ = writeln!(
            edges_svg,
            r#"    <line class="edge" x1="{:.4}" y1="{:.4}" x2="{:.4}" y2="{:.4}" stroke="{}" stroke-opacity="0.8" stroke-width="{}" />"#,
            pa.x, -pa.y, pb.x, -pb.y, color, EDGE_WIDTH
        );
    }

    let mut nodes_svg = String::new();
    for (name, position) in positions {
        let color = if is_major(*name) {
            MAJOR_NODE_COLOR
        } else {
            OTHER_NODE_COLOR
        };
        let _ = writeln!(
            nodes_svg,
            r#"    <circle class="node" data-account="{}" cx="{:.4}" cy="{:.4}" r="{}" fill="{}"><title>account: {}</title></circle>"#,
            encode_double_quoted_attribute(name),
            position.x,
            -position.y,
            NODE_RADIUS,
            color,
            encode_text(name),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <style>
    body {{ margin: 0; }}
    svg {{ width: 100%; height: auto; cursor: grab; }}
  </style>
</head>
<body>
  <svg id="network" xmlns="http://www.w3.org/2000/svg" viewBox="{min} {min} {size} {size}">
{edges}{nodes}  </svg>
  <script>
    (function () {{
      const svg = document.getElementById("network");
      let box = svg.viewBox.baseVal;
      let drag = null;
      svg.addEventListener("wheel", (event) => {{
        event.preventDefault();
        const factor = event.deltaY > 0 ? 1.1 : 1 / 1.1;
        const cx = box.x + box.width / 2;
        const cy = box.y + box.height / 2;
        box.width *= factor;
        box.height *= factor;
        box.x = cx - box.width / 2;
        box.y = cy - box.height / 2;
      }});
      svg.addEventListener("mousedown", (event) => {{ drag = {{ x: event.clientX, y: event.clientY }}; }});
      window.addEventListener("mouseup", () => {{ drag = null; }});
      window.addEventListener("mousemove", (event) => {{
        if (!drag) return;
        const scale = box.width / svg.clientWidth;
        box.x -= (event.clientX - drag.x) * scale;
        box.y -= (event.clientY - drag.y) * scale;
        drag = {{ x: event.clientX, y: event.clientY }};
      }});
    }})();
  </script>
</body>
</html>
"#,
        title = encode_text(title),
        min = -VIEW_EXTENT,
        size = 2.0 * VIEW_EXTENT,
        edges = edges_svg,
        nodes = nodes_svg,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Layout, compute_layout};

    fn major(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn render(pairs: &[(&str, &str)], major_accounts: &[&str]) -> String {
        let edges: Vec<Edge> = pairs.iter().copied().map(Edge::from).collect();
        let graph = SocialGraph::from_edges(&edges);
        let positions = compute_layout(&graph, Layout::Circular);
        render_network(&graph, &positions, &major(major_accounts), "test graph")
    }

    #[test]
    fn colors_nodes_by_membership() {
        let html = render(&[("A", "B"), ("A", "x"), ("B", "y")], &["A", "B"]);

        assert_eq!(html.matches(r#"fill="red""#).count(), 2);
        assert_eq!(html.matches(r#"fill="blue""#).count(), 2);
        assert!(html.contains("<title>account: x</title>"));
    }

    #[test]
    fn highlights_edges_between_major_accounts() {
        let html = render(&[("A", "B"), ("A", "x"), ("B", "y")], &["A", "B"]);

        assert_eq!(html.matches(r#"stroke="red""#).count(), 1);
        assert_eq!(html.matches(r#"stroke="black""#).count(), 2);
    }

    #[test]
    fn escapes_account_names() {
        let html = render(&[("A", "<b>\"evil\"</b>")], &["A"]);

        assert!(!html.contains("<b>\"evil\"</b>"));
        assert!(html.contains("account: &lt;b&gt;"));
    }

    #[test]
    fn uses_a_square_view_box() {
        let html = render(&[("A", "B")], &[]);
        assert!(html.contains(r#"viewBox="-10.1 -10.1 20.2 20.2""#));
    }
}
