//! UI-automation tree serialization (§4.1): walks the platform
//! accessibility root with bounded depth and fan-out, tagging nodes with
//! fixed namespace-prefixed attributes. The walk itself, and its bounds,
//! are the contract (§9 "UI-tree recursion bounds"); the tree *source* is
//! abstracted behind `AccessibilityProvider` so the bounded-walker logic
//! is exercised the same way regardless of which platform backend (UIA,
//! Win32) eventually supplies the root node.

pub const MAX_DEPTH: usize = 50;
pub const MAX_FANOUT: usize = 1025;
pub const MAX_SPREADSHEET_AXIS: usize = 500;

const NAMESPACES: &str = r#"xmlns:uia="https://accessibility.windows.example/uia" xmlns:app="https://accessibility.windows.example/app""#;

#[derive(Debug, Clone, Default)]
pub struct UiNode {
    pub role: String,
    pub name: String,
    pub rect: Option<(i64, i64, i64, i64)>,
    pub value: Option<String>,
    pub actions: Vec<String>,
    pub children: Vec<UiNode>,
    /// Present only on spreadsheet-grid nodes; triggers the capped
    /// row/column walker instead of the generic child walk.
    pub spreadsheet: Option<SpreadsheetGrid>,
}

#[derive(Debug, Clone)]
pub struct SpreadsheetGrid {
    pub rows: usize,
    pub cols: usize,
}

pub trait AccessibilityProvider: Send + Sync {
    fn root(&self, backend: &str) -> UiNode;
}

/// A minimal always-available provider used when no real platform backend
/// is wired in (non-Windows hosts, tests). Returns a tiny static desktop
/// tree so the bounded walker and its namespace tagging have something to
/// exercise.
#[derive(Default)]
pub struct SyntheticAccessibilityProvider;

impl AccessibilityProvider for SyntheticAccessibilityProvider {
    fn root(&self, _backend: &str) -> UiNode {
        UiNode {
            role: "pane".to_string(),
            name: "Desktop".to_string(),
            rect: Some((0, 0, 1920, 1080)),
            value: None,
            actions: vec![],
            spreadsheet: None,
            children: vec![UiNode {
                role: "window".to_string(),
                name: "Untitled".to_string(),
                rect: Some((0, 0, 1920, 1040)),
                value: None,
                actions: vec!["invoke".to_string()],
                spreadsheet: None,
                children: vec![],
            }],
        }
    }
}

pub fn render_tree(root: &UiNode, backend: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("<uia:tree backend=\"{backend}\" {NAMESPACES}>\n"));
    render_node(root, 0, &mut out);
    out.push_str("</uia:tree>\n");
    out
}

fn render_node(node: &UiNode, depth: usize, out: &mut String) {
    if depth > MAX_DEPTH {
        return;
    }
    let indent = "  ".repeat(depth + 1);
    let (x, y, w, h) = node.rect.unwrap_or((0, 0, 0, 0));
    let value_attr = node.value.as_deref().unwrap_or("");
    let actions_attr = node.actions.join(",");
    out.push_str(&format!(
        "{indent}<uia:node app:role=\"{role}\" app:name=\"{name}\" app:state=\"enabled\" app:screencoord=\"{x},{y}\" app:size=\"{w}x{h}\" app:value=\"{value_attr}\" app:actions=\"{actions_attr}\">\n",
        role = xml_escape(&node.role),
        name = xml_escape(&node.name),
    ));

    if let Some(grid) = &node.spreadsheet {
        render_spreadsheet(grid, depth + 1, out);
    } else {
        for child in node.children.iter().take(MAX_FANOUT) {
            render_node(child, depth + 1, out);
        }
    }

    out.push_str(&format!("{indent}</uia:node>\n"));
}

/// Spreadsheet tables get a specialized walker scanning rows/columns up to
/// the visibility frontier, capped at `MAX_SPREADSHEET_AXIS` per axis
/// (§4.1, §9).
fn render_spreadsheet(grid: &SpreadsheetGrid, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth + 1);
    let rows = grid.rows.min(MAX_SPREADSHEET_AXIS);
    let cols = grid.cols.min(MAX_SPREADSHEET_AXIS);
    for row in 0..rows {
        for col in 0..cols {
            out.push_str(&format!("{indent}<app:cell row=\"{row}\" col=\"{col}\"/>\n"));
        }
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_tree_renders_within_namespace() {
        let provider = SyntheticAccessibilityProvider;
        let xml = render_tree(&provider.root("uia"), "uia");
        assert!(xml.contains("uia:tree backend=\"uia\""));
        assert!(xml.contains("app:role=\"window\""));
    }

    #[test]
    fn depth_beyond_bound_is_not_rendered() {
        let mut leaf = UiNode { role: "leaf".to_string(), name: "deep".to_string(), ..Default::default() };
        for _ in 0..(MAX_DEPTH + 10) {
            leaf = UiNode { role: "wrap".to_string(), name: "n".to_string(), children: vec![leaf], ..Default::default() };
        }
        let xml = render_tree(&leaf, "uia");
        assert!(!xml.contains("\"deep\""));
    }

    #[test]
    fn fanout_beyond_bound_is_truncated() {
        let children: Vec<UiNode> = (0..(MAX_FANOUT + 50))
            .map(|i| UiNode { role: "child".to_string(), name: format!("c{i}"), ..Default::default() })
            .collect();
        let root = UiNode { role: "root".to_string(), name: "r".to_string(), children, ..Default::default() };
        let xml = render_tree(&root, "uia");
        let count = xml.matches("app:role=\"child\"").count();
        assert_eq!(count, MAX_FANOUT);
    }

    #[test]
    fn spreadsheet_scan_is_capped_per_axis() {
        let root = UiNode {
            role: "table".to_string(),
            name: "Sheet1".to_string(),
            spreadsheet: Some(SpreadsheetGrid { rows: MAX_SPREADSHEET_AXIS + 100, cols: 10 }),
            ..Default::default()
        };
        let xml = render_tree(&root, "uia");
        let count = xml.matches("<app:cell").count();
        assert_eq!(count, MAX_SPREADSHEET_AXIS * 10);
    }
}
