use anyhow::Result;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Metrics {
    /// Keyed by the full series name including labels,
    /// e.g. `docsort_documents_by_category_total{category="Bill"}`.
    pub counters: HashMap<String, f64>,
    pub histograms: HashMap<String, HistogramData>,
}

#[derive(Debug, Default)]
pub struct HistogramData {
    pub buckets: HashMap<String, f64>,
    pub sum: f64,
    pub count: f64,
}

/// Parse Prometheus metrics text format
pub fn prom_parse(text: &str) -> Result<Metrics> {
    let mut metrics = Metrics::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((series, value)) = parse_metric_line(line) else {
            anyhow::bail!("malformed metric line: {line}");
        };
        let base_name = series.split('{').next().unwrap_or(&series).to_string();

        if let Some(hist) = base_name.strip_suffix("_bucket") {
            let histogram = metrics.histograms.entry(hist.to_string()).or_default();
            histogram.buckets.insert(extract_bucket_name(&series), value);
        } else if let Some(hist) = base_name.strip_suffix("_sum") {
            metrics.histograms.entry(hist.to_string()).or_default().sum = value;
        } else if let Some(hist) = base_name.strip_suffix("_count") {
            metrics.histograms.entry(hist.to_string()).or_default().count = value;
        } else {
            metrics.counters.insert(series, value);
        }
    }

    Ok(metrics)
}

fn parse_metric_line(line: &str) -> Option<(String, f64)> {
    // Label values may contain spaces, so the value is the last token.
    let (series, value) = line.rsplit_once(' ')?;
    let value = value.parse::<f64>().ok()?;
    Some((series.trim().to_string(), value))
}

fn extract_bucket_name(series: &str) -> String {
    if let Some(start) = series.find("le=\"") {
        let start = start + 4;
        if let Some(end) = series[start..].find('"') {
            return series[start..start + end].to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prom_parse() {
        let text = r#"
# HELP docsort_documents_processed_total Total number of documents processed and stored
# TYPE docsort_documents_processed_total counter
docsort_documents_processed_total 5
docsort_documents_by_category_total{category="ID Document"} 2
# TYPE docsort_extraction_duration_ms histogram
docsort_extraction_duration_ms_bucket{le="10"} 1
docsort_extraction_duration_ms_bucket{le="+Inf"} 5
docsort_extraction_duration_ms_sum 100.5
docsort_extraction_duration_ms_count 5
"#;

        let metrics = prom_parse(text).unwrap();
        assert_eq!(metrics.counters.get("docsort_documents_processed_total"), Some(&5.0));
        assert_eq!(
            metrics
                .counters
                .get(r#"docsort_documents_by_category_total{category="ID Document"}"#),
            Some(&2.0)
        );

        let duration = metrics.histograms.get("docsort_extraction_duration_ms").unwrap();
        assert_eq!(duration.sum, 100.5);
        assert_eq!(duration.count, 5.0);
        assert_eq!(duration.buckets.get("10"), Some(&1.0));
        assert_eq!(duration.buckets.get("+Inf"), Some(&5.0));
    }

    #[test]
    fn test_prom_parse_rejects_garbage() {
        assert!(prom_parse("not a metric").is_err());
    }
}
