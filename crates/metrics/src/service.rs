use docsort_models::{Category, DocumentError, ExtractionMethod};
use prometheus::{Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use tracing::{debug, instrument};

pub struct MetricsService {
    registry: Registry,
    documents_processed_total: Counter,
    documents_by_category_total: CounterVec,
    extraction_errors_total: Counter,
    ocr_fallbacks_total: Counter,
    extraction_duration_ms: Histogram,
}

fn internal(e: prometheus::Error) -> DocumentError {
    DocumentError::InternalError {
        reason: e.to_string(),
    }
}

impl MetricsService {
    pub fn new() -> Result<Self, DocumentError> {
        let registry = Registry::new();

        let documents_processed_total = Counter::new(
            "docsort_documents_processed_total",
            "Total number of documents processed and stored",
        )
        .map_err(internal)?;

        let documents_by_category_total = CounterVec::new(
            Opts::new(
                "docsort_documents_by_category_total",
                "Stored documents per predicted category",
            ),
            &["category"],
        )
        .map_err(internal)?;

        let extraction_errors_total = Counter::new(
            "docsort_extraction_errors_total",
            "Total number of uploads rejected because text extraction failed",
        )
        .map_err(internal)?;

        let ocr_fallbacks_total = Counter::new(
            "docsort_ocr_fallbacks_total",
            "Total number of documents whose text was read, or attempted, by OCR",
        )
        .map_err(internal)?;

        let extraction_duration_ms = Histogram::with_opts(
            HistogramOpts::new(
                "docsort_extraction_duration_ms",
                "Text extraction duration in milliseconds",
            )
            .buckets(vec![
                10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0,
            ]),
        )
        .map_err(internal)?;

        registry
            .register(Box::new(documents_processed_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(documents_by_category_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(extraction_errors_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(ocr_fallbacks_total.clone()))
            .map_err(internal)?;
        registry
            .register(Box::new(extraction_duration_ms.clone()))
            .map_err(internal)?;

        Ok(Self {
            registry,
            documents_processed_total,
            documents_by_category_total,
            extraction_errors_total,
            ocr_fallbacks_total,
            extraction_duration_ms,
        })
    }

    #[instrument(skip(self))]
    pub async fn record_document(&self, category: Category, method: ExtractionMethod) {
        self.documents_processed_total.inc();
        self.documents_by_category_total
            .with_label_values(&[category.as_str()])
            .inc();
        if matches!(method, ExtractionMethod::Ocr | ExtractionMethod::OcrUnavailable) {
            self.ocr_fallbacks_total.inc();
        }
        debug!("Recorded document: {} via {}", category, method);
    }

    #[instrument(skip(self))]
    pub async fn record_extraction_error(&self, filename: &str) {
        self.extraction_errors_total.inc();
        debug!("Recorded extraction error for: {}", filename);
    }

    pub async fn record_extraction_duration(&self, duration_ms: f64) {
        self.extraction_duration_ms.observe(duration_ms);
    }

    #[instrument(skip(self))]
    pub async fn get_prometheus_metrics(&self) -> Result<String, DocumentError> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        encoder.encode(&metric_families, &mut buffer).map_err(internal)?;

        String::from_utf8(buffer).map_err(|e| DocumentError::InternalError {
            reason: e.to_string(),
        })
    }
}
