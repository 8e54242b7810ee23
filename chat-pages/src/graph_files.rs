use axohtml::{dom::DOMTree, html, text};
use chat_graph::GraphExport;
use std::fmt::{self, Write as _};

use crate::SocialGraphReport;

const PAGE_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
#network { width: 100%; height: 600px; border: 1px solid #ccc; }
.stats { background: #f5f5f5; padding: 15px; margin: 10px 0; border-radius: 5px; }
.stats h3 { margin-top: 0; }
";

const NETWORK_SCRIPT: &str = "\
var nodes = new vis.DataSet(graph.nodes.map(function (node) {
  return {
    id: node.id,
    label: node.label,
    value: node.mentionsSent + node.mentionsReceived,
    title: 'Sent: ' + node.mentionsSent + ', Received: ' + node.mentionsReceived
  };
}));

var edges = new vis.DataSet(graph.edges.map(function (edge, index) {
  return {
    id: index,
    from: edge.source,
    to: edge.target,
    value: edge.weight,
    title: edge.weight + ' mentions',
    arrows: 'to'
  };
}));

var options = {
  nodes: {
    shape: 'dot',
    scaling: { min: 10, max: 30 },
    font: { size: 12, color: '#000000' },
    borderWidth: 2,
    color: { background: '#97C2FC', border: '#2B7CE9' }
  },
  edges: {
    width: 0.15,
    color: { inherit: 'from' },
    smooth: { type: 'continuous' },
    scaling: { min: 1, max: 5 }
  },
  physics: {
    stabilization: { iterations: 150 },
    barnesHut: { gravitationalConstant: -8000, springConstant: 0.001, springLength: 200 }
  },
  interaction: { hover: true, tooltipDelay: 200 }
};

new vis.Network(document.getElementById('network'), { nodes: nodes, edges: edges }, options);
";

/// Escapes text for XML attribute values and character data. Control
/// characters XML 1.0 cannot carry are dropped.
pub fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(c),
            c if c.is_control() => {}
            c => escaped.push(c),
        }
    }
    escaped
}

/// Gephi GEXF 1.2 document of the mention graph.
pub fn render_gexf(graph: &GraphExport) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_gexf(&mut out, graph);
    out
}

fn write_gexf(out: &mut String, graph: &GraphExport) -> fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<gexf xmlns="http://www.gexf.net/1.2draft" version="1.2">"#)?;
    writeln!(out, "<meta>")?;
    writeln!(out, "<creator>chat-archive</creator>")?;
    writeln!(out, "<description>Mention graph between chat authors</description>")?;
    writeln!(out, "</meta>")?;
    writeln!(out, r#"<graph mode="static" defaultedgetype="directed">"#)?;

    writeln!(out, r#"<attributes class="node">"#)?;
    writeln!(out, r#"<attribute id="0" title="mentionsSent" type="long"/>"#)?;
    writeln!(out, r#"<attribute id="1" title="mentionsReceived" type="long"/>"#)?;
    writeln!(out, "</attributes>")?;

    writeln!(out, "<nodes>")?;
    for node in graph.nodes.iter() {
        writeln!(
            out,
            r#"<node id="{}" label="{}">"#,
            xml_escape(node.id.as_str()),
            xml_escape(&node.label)
        )?;
        writeln!(out, "<attvalues>")?;
        writeln!(out, r#"<attvalue for="0" value="{}"/>"#, node.mentions_sent)?;
        writeln!(out, r#"<attvalue for="1" value="{}"/>"#, node.mentions_received)?;
        writeln!(out, "</attvalues>")?;
        writeln!(out, "</node>")?;
    }
    writeln!(out, "</nodes>")?;

    writeln!(out, "<edges>")?;
    for (index, edge) in graph.edges.iter().enumerate() {
        writeln!(
            out,
            r#"<edge id="{}" source="{}" target="{}" weight="{}"/>"#,
            index,
            xml_escape(edge.source.as_str()),
            xml_escape(edge.target.as_str()),
            edge.weight
        )?;
    }
    writeln!(out, "</edges>")?;

    writeln!(out, "</graph>")?;
    write!(out, "</gexf>")
}

/// GraphML document of the mention graph.
pub fn render_graphml(graph: &GraphExport) -> String {
    let mut out = String::new();
    let _ = write_graphml(&mut out, graph);
    out
}

fn write_graphml(out: &mut String, graph: &GraphExport) -> fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<graphml xmlns="http://graphml.graphdrawing.org/xmlns">"#)?;
    writeln!(out, r#"<key id="label" for="node" attr.name="label" attr.type="string"/>"#)?;
    writeln!(
        out,
        r#"<key id="mentionsSent" for="node" attr.name="mentionsSent" attr.type="long"/>"#
    )?;
    writeln!(
        out,
        r#"<key id="mentionsReceived" for="node" attr.name="mentionsReceived" attr.type="long"/>"#
    )?;
    writeln!(out, r#"<key id="weight" for="edge" attr.name="weight" attr.type="long"/>"#)?;
    writeln!(out, r#"<graph id="SocialGraph" edgedefault="directed">"#)?;

    for node in graph.nodes.iter() {
        writeln!(out, r#"<node id="{}">"#, xml_escape(node.id.as_str()))?;
        writeln!(out, r#"<data key="label">{}</data>"#, xml_escape(&node.label))?;
        writeln!(out, r#"<data key="mentionsSent">{}</data>"#, node.mentions_sent)?;
        writeln!(out, r#"<data key="mentionsReceived">{}</data>"#, node.mentions_received)?;
        writeln!(out, "</node>")?;
    }

    for (index, edge) in graph.edges.iter().enumerate() {
        writeln!(
            out,
            r#"<edge id="e{}" source="{}" target="{}">"#,
            index,
            xml_escape(edge.source.as_str()),
            xml_escape(edge.target.as_str())
        )?;
        writeln!(out, r#"<data key="weight">{}</data>"#, edge.weight)?;
        writeln!(out, "</edge>")?;
    }

    writeln!(out, "</graph>")?;
    write!(out, "</graphml>")
}

/// Page with the network statistics and a vis-network canvas. The graph
/// itself is loaded from the companion script.
pub fn render_html_page(report: &SocialGraphReport) -> DOMTree<String> {
    let stats = &report.statistics;
    let rows = vec![
        ("Total Users", stats.total_users.to_string()),
        ("Total Mentions", stats.total_mentions.to_string()),
        ("Total Connections", stats.total_connections.to_string()),
        (
            "Average Connections per User",
            format!("{:.2}", stats.average_connections_per_user),
        ),
    ];

    html!(
        <html>
            <head>
                <title>"Social Graph"</title>
                <style>{ text!("{}", PAGE_STYLE) }</style>
            </head>
            <body>
                <h1>"Social Graph"</h1>
                <div class="stats">
                    <h3>"Network Statistics"</h3>
                    { rows.iter().map(|(label, value)| html!(
                        <p><strong>{ text!("{}:", label) }</strong>{ text!(" {}", value) }</p>
                    )) }
                </div>
                <div id="network"></div>
                <script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
                <script src="social-graph.js"></script>
            </body>
        </html>
    )
}

/// Script the page loads: the graph as JSON, then the vis-network setup.
pub fn render_graph_script(graph: &GraphExport) -> Result<String, serde_json::Error> {
    let data = serde_json::to_string(graph)?;
    Ok(format!("var graph = {};\n\n{}", data, NETWORK_SCRIPT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_graph::{GraphEdge, GraphNode};
    use chat_ref::AuthorId;

    fn graph() -> GraphExport {
        GraphExport {
            nodes: vec![
                GraphNode {
                    id: AuthorId::from("1"),
                    label: "<b>Tom & \"Jerry\"</b>".to_string(),
                    mentions_sent: 3,
                    mentions_received: 0,
                },
                GraphNode {
                    id: AuthorId::from("2"),
                    label: "o'neil\u{7}".to_string(),
                    mentions_sent: 0,
                    mentions_received: 3,
                },
            ],
            edges: vec![GraphEdge {
                source: AuthorId::from("1"),
                target: AuthorId::from("2"),
                weight: 3,
            }],
        }
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(
            xml_escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;&lt;/a&gt;"
        );
        assert_eq!(xml_escape("bell\u{7}\ttab"), "bell\ttab");
        assert_eq!(xml_escape("🔥 plain"), "🔥 plain");
    }

    #[test]
    fn test_render_gexf() {
        let gexf = render_gexf(&graph());
        assert!(gexf.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(gexf.contains(
            r#"<node id="1" label="&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;">"#
        ));
        assert!(gexf.contains(r#"<node id="2" label="o&apos;neil">"#));
        assert!(gexf.contains(r#"<attvalue for="1" value="3"/>"#));
        assert!(gexf.contains(r#"<edge id="0" source="1" target="2" weight="3"/>"#));
        assert_eq!(gexf.matches("<node ").count(), 2);
        assert!(gexf.ends_with("</gexf>"));
    }

    #[test]
    fn test_render_graphml() {
        let graphml = render_graphml(&graph());
        assert!(graphml.contains(r#"<graph id="SocialGraph" edgedefault="directed">"#));
        assert!(graphml.contains(
            r#"<data key="label">&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;</data>"#
        ));
        assert!(graphml.contains(r#"<edge id="e0" source="1" target="2">"#));
        assert!(graphml.contains(r#"<data key="weight">3</data>"#));
        assert_eq!(graphml.matches("<edge ").count(), 1);
        assert!(graphml.ends_with("</graphml>"));
    }

    #[test]
    fn test_render_graph_script() {
        let script = render_graph_script(&graph()).unwrap();
        let data = script
            .strip_prefix("var graph = ")
            .and_then(|rest| rest.split_once(";\n"))
            .map(|(json, _)| json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(data).unwrap();
        assert_eq!(value["nodes"][0]["label"], "<b>Tom & \"Jerry\"</b>");
        assert_eq!(value["edges"][0]["weight"], 3);
        assert!(script.contains("new vis.Network("));
    }
}
