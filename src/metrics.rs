use std::sync::LazyLock;

use prometheus::*;

static METRIC_ADD_COUNT: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!("media_add_count", "count of the media vectors added").unwrap()
});

static METRIC_SEARCH_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!("media_search_count", "count of the searches", &["filtered"])
        .unwrap()
});

static METRIC_SEARCH_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "media_search_duration",
        "duration of the per-query search in seconds",
        &["filtered"]
    )
    .unwrap()
});

static METRIC_SEARCH_RESULTS: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "media_search_results",
        "number of the results returned by a search",
        &["filtered"],
        vec![0., 1., 5., 10., 20., 50., 100.]
    )
    .unwrap()
});

/// 增加添加计数
pub fn inc_add_count() {
    METRIC_ADD_COUNT.inc();
}

/// 记录一次搜索
pub fn inc_search(filtered: bool, duration: f32, results: usize) {
    let label = if filtered { "true" } else { "false" };

    METRIC_SEARCH_COUNT.with_label_values(&[label]).inc();
    METRIC_SEARCH_DURATION.with_label_values(&[label]).observe(duration as f64);
    METRIC_SEARCH_RESULTS.with_label_values(&[label]).observe(results as f64);
}

/// 以文本格式导出所有指标
pub fn gather_text() -> String {
    let mut buf = String::new();
    if let Err(e) = TextEncoder::new().encode_utf8(&prometheus::gather(), &mut buf) {
        log::error!("导出指标失败: {e}");
    }
    buf
}
