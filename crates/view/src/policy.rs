//! Policy table
//!
//! The policy is shown as markup rather than drawn on a surface: a table of
//! direction glyphs for grid environments, a count otherwise.

use std::fmt;
use std::fmt::Write as _;

use crate::action::policy_glyph;
use crate::environment::{Cell, EnvironmentDescriptor, Layout};

const PLACEHOLDER: &str = "Train to see policy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyView {
    /// No policy trained yet.
    Placeholder,
    /// Glyph per cell, row-major, same indexing as the value heat map.
    Grid { rows: Vec<Vec<char>>, compact: bool },
    /// Environments without a grid only report the table size.
    Summary { pairs: usize },
}

/// Build the policy display for `policy` in the active environment.
#[must_use]
pub fn render_policy(policy: Option<&[u8]>, descriptor: Option<&EnvironmentDescriptor>) -> PolicyView {
    let (Some(policy), Some(descriptor)) = (policy, descriptor) else {
        return PolicyView::Placeholder;
    };
    let Some(shape) = descriptor.layout.grid_shape() else {
        return PolicyView::Summary {
            pairs: policy.len(),
        };
    };

    let rows = (0..shape.height)
        .map(|row| {
            (0..shape.width)
                .map(|col| {
                    let index = shape.index(Cell::new(row, col));
                    policy.get(index).map_or('?', |id| policy_glyph(*id))
                })
                .collect()
        })
        .collect();

    PolicyView::Grid {
        rows,
        compact: matches!(descriptor.layout, Layout::CliffWalking(_)),
    }
}

impl PolicyView {
    /// Glyph at `(row, col)` of a grid policy.
    #[must_use]
    pub fn glyph(&self, row: usize, col: usize) -> Option<char> {
        match self {
            PolicyView::Grid { rows, .. } => rows.get(row).and_then(|r| r.get(col)).copied(),
            _ => None,
        }
    }

    /// HTML table for embedding in a page.
    #[must_use]
    pub fn to_html(&self) -> String {
        let (rows, compact) = match self {
            PolicyView::Grid { rows, compact } => (rows, *compact),
            other => return format!("<p>{other}</p>"),
        };
        let cell_style = if compact {
            "border:1px solid #ccc; width:25px; height:25px; text-align:center; font-size:12px;"
        } else {
            "border:1px solid #ccc; width:30px; height:30px; text-align:center;"
        };

        let mut html = String::from("<table style=\"border-collapse: collapse;\">");
        for row in rows {
            html.push_str("<tr>");
            for glyph in row {
                let _ = write!(html, "<td style=\"{cell_style}\">{glyph}</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</table>");
        html
    }
}

impl fmt::Display for PolicyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyView::Placeholder => f.write_str(PLACEHOLDER),
            PolicyView::Summary { pairs } => write!(f, "Policy: {pairs} state-action pairs"),
            PolicyView::Grid { rows, .. } => {
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        f.write_str("\n")?;
                    }
                    let line: Vec<String> = row.iter().map(char::to_string).collect();
                    f.write_str(&line.join(" "))?;
                }
                Ok(())
            }
        }
    }
}
