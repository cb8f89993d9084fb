use crate::classifier::argmax;
use ndarray::ArrayView1;

/// The studio is only built once the extractor has loaded.
pub const STATUS_LOADED: &str = "Feature extractor loaded";
pub const STATUS_NO_DATA: &str = "No data collected";
pub const STATUS_TRAINING: &str = "Training...";
pub const STATUS_PREDICTING: &str = "Training complete, predicting";

pub fn class_count_text(count: usize) -> String {
    format!("Data count: {}", count)
}

/// "Prediction: <name> with <n>% confidence" for the most likely class.
/// Confidence is floored to a whole percent; equal maxima resolve to the lowest index.
pub fn prediction_text(class_names: &[String], probabilities: ArrayView1<f32>) -> Option<String> {
    let best = argmax(probabilities)?;
    let name = class_names.get(best)?;
    let percent = (probabilities[best] * 100.0).floor() as u32;
    Some(format!("Prediction: {} with {}% confidence", name, percent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_prediction_text_uses_top_class() {
        let text = prediction_text(&names(&["Cat", "Dog", "Bird"]), array![0.7, 0.2, 0.1].view());
        assert_eq!(text.as_deref(), Some("Prediction: Cat with 70% confidence"));
    }

    #[test]
    fn test_prediction_text_floors_confidence() {
        let text = prediction_text(&names(&["A", "B"]), array![0.019, 0.981].view());
        assert_eq!(text.as_deref(), Some("Prediction: B with 98% confidence"));
    }

    #[test]
    fn test_prediction_text_ties_pick_first() {
        let text = prediction_text(&names(&["A", "B"]), array![0.5, 0.5].view());
        assert_eq!(text.as_deref(), Some("Prediction: A with 50% confidence"));
    }

    #[test]
    fn test_prediction_text_needs_a_name() {
        assert_eq!(prediction_text(&names(&["A"]), array![0.1, 0.9].view()), None);
    }

    #[test]
    fn test_class_count_text() {
        assert_eq!(class_count_text(12), "Data count: 12");
    }
}
