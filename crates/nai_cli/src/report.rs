use std::fmt::Write;

use nai_core::highlight::{highlight_article, highlight_summary, Highlighted};
use nai_core::PipelineOutput;

/// Standalone HTML page showing the summary next to the article with
/// matching sentences highlighted in the same color.
pub struct Report {
    pub html: String,
    /// Fragments the model returned that were not found verbatim.
    pub unmatched: Vec<String>,
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn plain_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn paragraph(html: &str) -> String {
    format!("<p>{}</p>", html.replace('\n', "<br>"))
}

/// Highlights each paragraph on its own so no `<mark>` crosses a `<p>`.
/// A fragment counts as unmatched only when no paragraph contains it.
fn highlighted_paragraphs<'a>(
    text: &'a str,
    highlight: impl Fn(&'a str) -> Highlighted<'a>,
    unmatched: &mut Vec<String>,
) -> String {
    let mut missing: Option<Vec<String>> = None;
    let mut html = Vec::new();
    for p in plain_paragraphs(text) {
        let highlighted = highlight(p);
        missing = Some(match missing {
            None => highlighted.unmatched.clone(),
            Some(prev) => prev
                .into_iter()
                .filter(|f| highlighted.unmatched.contains(f))
                .collect(),
        });
        html.push(paragraph(&highlighted.render_html()));
    }
    unmatched.extend(missing.unwrap_or_default());
    html.join("\n")
}

pub fn render_report(output: &PipelineOutput) -> Report {
    let matches = &output.matches;
    let mut unmatched = Vec::new();
    let summary = highlighted_paragraphs(&output.summary, |p| highlight_summary(p, matches), &mut unmatched);
    let article = highlighted_paragraphs(output.article.text(), |p| highlight_article(p, matches), &mut unmatched);
    let arabic = plain_paragraphs(&output.arabic_summary)
        .into_iter()
        .map(|p| paragraph(&escape(p)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(
        html,
        "<title>{}</title>\n</head>\n<body>",
        escape(output.article.title().unwrap_or("News AI report"))
    );

    let _ = writeln!(html, "<section class=\"summary\">\n<h2>Summary</h2>");
    let _ = writeln!(html, "{}", summary);
    let _ = writeln!(html, "</section>");

    let _ = writeln!(html, "<section class=\"arabic\" dir=\"rtl\" lang=\"ar\">\n<h2>الملخص</h2>");
    let _ = writeln!(html, "{}", arabic);
    let _ = writeln!(html, "</section>");

    let _ = writeln!(html, "<section class=\"key-info\">\n<h2>Key information</h2>\n<dl>");
    for (question, answer) in output.key_info.iter() {
        let _ = writeln!(html, "<dt>{}</dt><dd>{}</dd>", question.label(), escape(answer));
    }
    let _ = writeln!(html, "</dl>\n</section>");

    let _ = writeln!(html, "<section class=\"article\">\n<h2>Article</h2>");
    let _ = writeln!(html, "{}", article);
    let _ = writeln!(html, "</section>\n</body>\n</html>");

    Report { html, unmatched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nai_core::{Article, KeyInfo, SentenceMatch};

    fn output() -> PipelineOutput {
        PipelineOutput {
            article: Article::new("Lumen & co\n\nAcme unveiled Lumen on Monday. It routes light."),
            key_info: KeyInfo::from_answers([
                "Photonics".to_string(),
                "<b>Faster</b>".to_string(),
                "Datacenters".to_string(),
            ]),
            summary: "Lumen\n\nAcme launched Lumen.".to_string(),
            arabic_summary: "لومن\n\nأطلقت أكمي لومن.".to_string(),
            matches: vec![SentenceMatch {
                summary_sentence: "Acme launched Lumen.".to_string(),
                article_sentences: vec![
                    "Acme unveiled Lumen on Monday.".to_string(),
                    "It bends light.".to_string(),
                ],
            }],
        }
    }

    #[test]
    fn test_report_highlights_both_sides() {
        let report = render_report(&output());
        assert_eq!(report.html.matches("<mark data-match=\"0\"").count(), 2);
        assert!(report.html.contains("<title>Lumen &amp; co</title>"));
        assert!(report.html.contains("dir=\"rtl\""));
        assert!(report.html.contains("&lt;b&gt;Faster&lt;/b&gt;"));
        assert_eq!(report.unmatched, vec!["It bends light.".to_string()]);
    }

    #[test]
    fn test_marks_stay_inside_paragraphs() {
        let mut output = output();
        output.matches = vec![SentenceMatch {
            summary_sentence: "Acme launched Lumen.".to_string(),
            article_sentences: vec!["Lumen & co\n\nAcme unveiled Lumen on Monday.".to_string()],
        }];
        let report = render_report(&output);
        for p in report.html.split("<p>").skip(1) {
            let p = p.split("</p>").next().unwrap();
            assert_eq!(p.matches("<mark").count(), p.matches("</mark>").count(), "{}", p);
        }
        assert_eq!(
            report.unmatched,
            vec!["Lumen & co\n\nAcme unveiled Lumen on Monday.".to_string()]
        );
    }
}
