//! CFG export for the external renderer
//!
//! Two formats: Graphviz DOT for diagram export and JSON for tooling. Dead
//! blocks render dashed so dropped code stays visible in diagrams.

use crate::errors::Result;
use crate::features::cfg::domain::ControlFlowGraph;

/// Render the graph as Graphviz DOT
pub fn to_dot(cfg: &ControlFlowGraph) -> String {
    let mut out = String::new();
    out.push_str(&format!("digraph \"{}\" {{\n", cfg.function_name));
    out.push_str("  node [shape=box, fontname=\"monospace\"];\n");

    for block in cfg.blocks() {
        let mut lines: Vec<String> = block.statements.iter().map(|s| s.summary()).collect();
        if let Some(cond) = &block.branch_cond {
            lines.push(format!("if {cond}"));
        }
        let mut label = format!("b{}", block.id);
        if !lines.is_empty() {
            label.push_str("\\n");
            label.push_str(&lines.join("\\n").replace('"', "\\\""));
        }
        let style = if block.dead { ", style=dashed" } else { "" };
        out.push_str(&format!(
            "  b{} [label=\"{}\"{}];\n",
            block.id, label, style
        ));
    }

    for block in cfg.blocks() {
        for edge in &block.edges {
            out.push_str(&format!(
                "  b{} -> b{} [label=\"{}\"];\n",
                block.id,
                edge.target,
                edge.kind.as_str()
            ));
        }
    }

    out.push_str("}\n");
    out
}

/// Serialize the graph as pretty-printed JSON
pub fn to_json(cfg: &ControlFlowGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(cfg)?)
}
