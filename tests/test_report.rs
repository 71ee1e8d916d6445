//! Integration test: charts and persisted report

use evalbench::evaluation::{ClassificationScores, ResultRecord, ResultTable};
use evalbench::report::{Reporter, PERFORMANCE_CHART_FILE, TIMING_CHART_FILE};
use evalbench::visualization::BarChart;

fn table(names: &[&str]) -> ResultTable {
    let mut table = ResultTable::new();
    for (i, name) in names.iter().enumerate() {
        let v = 0.5 + i as f64 * 0.1;
        table.push(ResultRecord::new(
            *name,
            ClassificationScores {
                accuracy: v,
                f1: v,
                recall: v,
                precision: v,
            },
            i as f64,
            0.01,
        ));
    }
    table
}

fn category_labels(svg: &str) -> Vec<String> {
    svg.lines()
        .filter(|l| l.contains("class=\"axis category\""))
        .filter_map(|l| {
            let start = l.find('>')? + 1;
            let end = l[start..].find('<')? + start;
            Some(l[start..end].to_string())
        })
        .collect()
}

#[test]
fn test_svg_charts_list_models_in_registry_order() {
    let names = ["Random Forest", "KNN", "AdaBoost"];
    let dir = tempfile::tempdir().unwrap();

    Reporter::new(dir.path())
        .aggregate(&table(&names), &mut std::io::sink())
        .unwrap();

    for file in [PERFORMANCE_CHART_FILE, TIMING_CHART_FILE] {
        let svg = std::fs::read_to_string(dir.path().join(file)).unwrap();
        assert_eq!(category_labels(&svg), names);
    }
}

#[test]
fn test_chart_titles_and_axes() {
    let t = table(&["KNN"]);
    let performance = BarChart::performance(&t).to_svg();
    let timing = BarChart::timing(&t).to_svg();

    assert!(performance.contains("Model Performance Comparison"));
    assert!(performance.contains(">Score<"));
    assert!(timing.contains("Execution Time by Model"));
    assert!(timing.contains(">Seconds<"));
}

#[test]
fn test_console_table_precedes_terminal_charts() {
    let dir = tempfile::tempdir().unwrap();
    let mut console = Vec::new();
    Reporter::new(dir.path())
        .aggregate(&table(&["KNN", "Naive Bayes"]), &mut console)
        .unwrap();

    let text = String::from_utf8(console).unwrap();
    let table_at = text.find("Model").unwrap();
    let chart_at = text.find("Model Performance Comparison").unwrap();
    let timing_at = text.find("Execution Time by Model").unwrap();
    assert!(table_at < chart_at && chart_at < timing_at);
    assert!(text.contains('█'));
}
