//! HTML rendering of the dashboard page.

use crate::charts::escape_text;
use crate::dashboard::{
    ChartPanel, Dashboard, Section, FILTER_LABEL, METRICS_HEADING, PAGE_TITLE, TAB_TITLE,
};
use crate::error::DataError;
use crate::filter::{APPLIED_PARAM, STATE_PARAM};
use std::fmt::Write;

const STYLE: &str = r#"
    body { font-family: "Source Sans Pro", "Inter", system-ui, sans-serif; margin: 0; background: #ffffff; color: #31333f; }
    main { max-width: 1200px; margin: 0 auto; padding: 2rem 2.5rem 3rem; }
    h1 { font-size: 2.2rem; margin: 0 0 1.25rem; }
    h3 { font-size: 1.4rem; margin: 1.5rem 0 0.75rem; }
    hr { border: none; border-top: 1px solid #e6e9ef; margin: 2rem 0; }
    form.filter label { display: block; font-size: 0.9rem; margin-bottom: 0.4rem; }
    form.filter select { min-width: 320px; padding: 0.25rem; border: 1px solid #d6d8de; border-radius: 6px; }
    form.filter .actions { margin-top: 0.5rem; display: flex; gap: 0.75rem; align-items: center; }
    form.filter button { background: #ff4b4b; color: #fff; border: none; border-radius: 6px; padding: 0.4rem 1rem; cursor: pointer; }
    .metrics { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1rem; }
    .metric .label { font-size: 0.9rem; color: #5f6270; }
    .metric .value { font-size: 2.2rem; }
    .columns { display: grid; grid-template-columns: repeat(2, 1fr); gap: 1.5rem; }
    .chart svg { width: 100%; height: auto; }
    .error { background: #ffecec; color: #7d353b; border-radius: 8px; padding: 1rem 1.25rem; }
    .caption { font-size: 0.85rem; color: #8c8f99; margin-top: 2rem; }
"#;

fn open_page(html: &mut String) {
    let _ = writeln!(html, "<!doctype html>");
    let _ = writeln!(html, "<html lang=\"en\">");
    let _ = writeln!(html, "<head>");
    let _ = writeln!(html, "  <meta charset=\"utf-8\" />");
    let _ = writeln!(
        html,
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />"
    );
    let _ = writeln!(html, "  <title>{}</title>", escape_text(TAB_TITLE));
    let _ = writeln!(html, "  <style>{}</style>", STYLE);
    let _ = writeln!(html, "</head>");
    let _ = writeln!(html, "<body>");
    let _ = writeln!(html, "<main>");
    let _ = writeln!(html, "  <h1>{}</h1>", escape_text(PAGE_TITLE));
}

fn close_page(html: &mut String) {
    let _ = writeln!(html, "</main>");
    let _ = writeln!(html, "</body>");
    let _ = writeln!(html, "</html>");
}

/// The full dashboard page.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut html = String::new();
    open_page(&mut html);

    filter_form(&mut html, dashboard);

    let _ = writeln!(html, "  <h3>{}</h3>", escape_text(METRICS_HEADING));
    let metrics = &dashboard.metrics;
    let _ = writeln!(html, "  <div class=\"metrics\">");
    for (label, value) in [
        ("Avg Days", metrics.avg_days_display()),
        ("Avg Attempts", metrics.avg_attempts_display()),
        ("Common Attempts", metrics.common_attempts_display()),
    ] {
        let _ = writeln!(
            html,
            "    <div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
            label,
            escape_text(&value)
        );
    }
    let _ = writeln!(html, "  </div>");

    for section in &dashboard.sections {
        let _ = writeln!(html, "  <hr />");
        match section {
            Section::Pair(left, right) => {
                let _ = writeln!(html, "  <div class=\"columns\">");
                chart_cell(&mut html, left);
                chart_cell(&mut html, right);
                let _ = writeln!(html, "  </div>");
            }
            Section::Solo(panel) => chart_cell(&mut html, panel),
        }
    }

    let _ = writeln!(
        html,
        "  <p class=\"caption\">{}</p>",
        escape_text(dashboard.caption)
    );
    close_page(&mut html);
    html
}

/// The page shown when the dataset cannot be loaded. Nothing but the title
/// and the error.
pub fn render_error(error: &DataError) -> String {
    let mut html = String::new();
    open_page(&mut html);
    let _ = writeln!(
        html,
        "  <div class=\"error\" role=\"alert\">{}</div>",
        escape_text(&error.to_string())
    );
    close_page(&mut html);
    html
}

fn filter_form(html: &mut String, dashboard: &Dashboard) {
    let size = dashboard.available_states.len().clamp(2, 10);
    let _ = writeln!(html, "  <form class=\"filter\" method=\"get\" action=\"/\">");
    let _ = writeln!(
        html,
        "    <label for=\"state-filter\">{}</label>",
        escape_text(FILTER_LABEL)
    );
    let _ = writeln!(
        html,
        "    <select id=\"state-filter\" name=\"{STATE_PARAM}\" multiple size=\"{size}\">"
    );
    for state in &dashboard.available_states {
        let selected = if dashboard.is_selected(state) {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(
            html,
            "      <option value=\"{}\"{}>{}</option>",
            escape_text(state),
            selected,
            escape_text(state)
        );
    }
    let _ = writeln!(html, "    </select>");
    let _ = writeln!(
        html,
        "    <input type=\"hidden\" name=\"{APPLIED_PARAM}\" value=\"1\" />"
    );
    let _ = writeln!(
        html,
        "    <div class=\"actions\"><button type=\"submit\">Apply</button><a href=\"/\">Select all</a><span>{} of {} shipments</span></div>",
        dashboard.filtered_shipments, dashboard.total_shipments
    );
    let _ = writeln!(html, "  </form>");
}

fn chart_cell(html: &mut String, panel: &ChartPanel) {
    let _ = writeln!(html, "  <div class=\"chart\" id=\"{}\">", panel.id);
    html.push_str(&panel.chart.to_svg());
    let _ = writeln!(html, "  </div>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::FOOTER_CAPTION;
    use crate::filter::Selection;
    use crate::models::sample_dataset;
    use std::path::PathBuf;

    #[test]
    fn test_filter_marks_selected_states() {
        let dashboard = Dashboard::build(&sample_dataset(), &Selection::from_states(["B"]));
        let html = render_dashboard(&dashboard);

        assert!(html.contains("<option value=\"A\">A</option>"));
        assert!(html.contains("<option value=\"B\" selected>B</option>"));
        assert!(html.contains("name=\"applied\" value=\"1\""));
        assert!(html.contains("1 of 3 shipments"));
    }

    #[test]
    fn test_dividers_between_sections() {
        let dashboard = Dashboard::build(&sample_dataset(), &Selection::All);
        let html = render_dashboard(&dashboard);
        assert_eq!(html.matches("<hr />").count(), dashboard.sections.len());
        assert!(html.contains(&format!("<p class=\"caption\">{}</p>", FOOTER_CAPTION)));
    }

    #[test]
    fn test_empty_view_shows_unavailable_metrics() {
        let dashboard =
            Dashboard::build(&sample_dataset(), &Selection::from_states(Vec::<String>::new()));
        let html = render_dashboard(&dashboard);
        assert_eq!(html.matches(">N/A</div>").count(), 3);
        assert_eq!(html.matches("No data").count(), 7);
    }

    #[test]
    fn test_error_page_has_no_dashboard() {
        let html = render_error(&DataError::MissingFile {
            path: PathBuf::from("output/flattened_shipments.csv"),
        });
        assert!(html.contains("output/flattened_shipments.csv not found"));
        assert!(!html.contains("<form"));
        assert!(!html.contains("<svg"));
    }
}
