use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use crate::metrics::MetricVector;
    use crate::output::json::render_json;

    #[test]
    fn renders_metric_keys_in_camel_case() {
        let text = render_json(&MetricVector::uniform(50.0)).expect("json");
        assert!(text.contains("\"customerSatisfaction\": 50.0"));
        assert!(text.contains('\n'));
    }
}
