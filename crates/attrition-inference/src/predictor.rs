//! Record encoding plus model scoring.
//!
//! A [`Predictor`] pairs a [`GradientBoostingModel`] with the encoder that
//! produces its inputs. The encoder is either a fitted
//! [`FeaturePipeline`] (the default) or, in the refit compatibility mode, the
//! reference dataset the encoders are refitted over for every record.

use crate::config::{EncodingMode, PredictorConfig};
use crate::error::{InferenceError, Result};
use crate::model::{GradientBoostingModel, class_index, sigmoid};
use crate::types::{Attrition, ModelInfo, Prediction};
use attrition_processing::{
    EmployeeRecord, FeaturePipeline, FeatureVector, ProcessingConfig, ReferenceDataset,
    feature_names,
};
use tracing::{debug, info};

/// Source of feature vectors for the model.
#[derive(Debug, Clone)]
enum FeatureEncoder {
    Fitted(FeaturePipeline),
    Refit {
        dataset: ReferenceDataset,
        config: ProcessingConfig,
    },
}

impl FeatureEncoder {
    fn encode(&self, record: &EmployeeRecord) -> Result<FeatureVector> {
        let vector = match self {
            FeatureEncoder::Fitted(pipeline) => pipeline.transform(record)?,
            FeatureEncoder::Refit { dataset, config } => {
                FeaturePipeline::refit_transform(dataset, record, config)?
            }
        };
        Ok(vector)
    }

    fn mode(&self) -> EncodingMode {
        match self {
            FeatureEncoder::Fitted(_) => EncodingMode::Fitted,
            FeatureEncoder::Refit { .. } => EncodingMode::RefitPerRequest,
        }
    }
}

/// Predicts attrition for employee records.
///
/// # Example
///
/// ```rust,ignore
/// use attrition_inference::{Predictor, PredictorConfig};
///
/// let config = PredictorConfig::builder()
///     .model_path("model.json")
///     .pipeline_path("pipeline.json")
///     .build()?;
/// let predictor = Predictor::from_config(&config)?;
///
/// let prediction = predictor.predict(&record)?;
/// println!("{}", prediction); // "Attrition: No"
/// ```
#[derive(Debug, Clone)]
pub struct Predictor {
    model: GradientBoostingModel,
    encoder: FeatureEncoder,
    decision_threshold: f64,
}

static_assertions::assert_impl_all!(Predictor: Send, Sync);

impl Predictor {
    /// Predictor over a fitted pipeline.
    pub fn new(
        model: GradientBoostingModel,
        pipeline: FeaturePipeline,
        decision_threshold: f64,
    ) -> Result<Self> {
        check_feature_order(&model, &pipeline.feature_names())?;
        Self::with_encoder(model, FeatureEncoder::Fitted(pipeline), decision_threshold)
    }

    /// Predictor that refits encoders over `dataset` for every record.
    pub fn with_reference(
        model: GradientBoostingModel,
        dataset: ReferenceDataset,
        config: ProcessingConfig,
        decision_threshold: f64,
    ) -> Result<Self> {
        let names: Vec<&str> = feature_names().collect();
        check_feature_order(&model, &names)?;
        Self::with_encoder(
            model,
            FeatureEncoder::Refit { dataset, config },
            decision_threshold,
        )
    }

    fn with_encoder(
        model: GradientBoostingModel,
        encoder: FeatureEncoder,
        decision_threshold: f64,
    ) -> Result<Self> {
        if !(decision_threshold > 0.0 && decision_threshold < 1.0) {
            return Err(InferenceError::InvalidConfig(format!(
                "decision_threshold must be in (0, 1), got {}",
                decision_threshold
            )));
        }
        Ok(Self {
            model,
            encoder,
            decision_threshold,
        })
    }

    /// Load the model and encoder named by `config`.
    pub fn from_config(config: &PredictorConfig) -> Result<Self> {
        config.validate()?;
        let model = GradientBoostingModel::load(&config.model_path)?;

        let predictor = match (
            config.encoding_mode,
            &config.pipeline_path,
            &config.reference_path,
        ) {
            (EncodingMode::Fitted, Some(path), _) => {
                let pipeline = FeaturePipeline::load(path)?;
                Self::new(model, pipeline, config.decision_threshold)?
            }
            (EncodingMode::RefitPerRequest, _, Some(path)) => {
                let dataset = ReferenceDataset::load(path, &config.processing)?;
                Self::with_reference(
                    model,
                    dataset,
                    config.processing.clone(),
                    config.decision_threshold,
                )?
            }
            (mode, _, _) => {
                return Err(InferenceError::InvalidConfig(format!(
                    "no artifact configured for {} encoding",
                    mode.as_str()
                )));
            }
        };

        info!(
            "Predictor ready ({} encoding, threshold {})",
            predictor.encoding_mode().as_str(),
            predictor.decision_threshold
        );
        Ok(predictor)
    }

    /// Feature vector the model sees for `record`.
    pub fn encode(&self, record: &EmployeeRecord) -> Result<FeatureVector> {
        self.encoder.encode(record)
    }

    /// Predict attrition for one record.
    pub fn predict(&self, record: &EmployeeRecord) -> Result<Prediction> {
        let features = self.encode(record)?;
        let raw_score = self.model.decision_function(features.as_slice())?;
        let probability = sigmoid(raw_score);
        let class = class_index(probability, self.decision_threshold);
        let attrition = Attrition::from_class_index(class).ok_or_else(|| {
            InferenceError::InvalidModel(format!("class index {} is not binary", class))
        })?;
        debug!(
            "Scored record: raw {:.4}, p(Yes) {:.4} → {}",
            raw_score, probability, attrition
        );

        Ok(Prediction {
            attrition,
            probability,
            raw_score,
        })
    }

    /// Predict attrition for several records; fails on the first invalid one.
    pub fn predict_batch(&self, records: &[EmployeeRecord]) -> Result<Vec<Prediction>> {
        records.iter().map(|record| self.predict(record)).collect()
    }

    pub fn encoding_mode(&self) -> EncodingMode {
        self.encoder.mode()
    }

    pub fn decision_threshold(&self) -> f64 {
        self.decision_threshold
    }

    pub fn model(&self) -> &GradientBoostingModel {
        &self.model
    }

    /// Model and encoder metadata.
    pub fn info(&self) -> ModelInfo {
        let (pipeline_fitted_at, reference_rows) = match &self.encoder {
            FeatureEncoder::Fitted(pipeline) => (
                Some(pipeline.fitted_at().to_rfc3339()),
                pipeline.reference_rows(),
            ),
            FeatureEncoder::Refit { dataset, .. } => (None, dataset.height()),
        };

        ModelInfo {
            model_type: self.model.model_type().to_string(),
            feature_names: self.model.feature_names().to_vec(),
            class_labels: self.model.classes().to_vec(),
            n_trees: self.model.n_trees(),
            learning_rate: self.model.learning_rate(),
            encoding_mode: self.encoding_mode(),
            decision_threshold: self.decision_threshold,
            pipeline_fitted_at,
            reference_rows,
        }
    }
}

fn check_feature_order(model: &GradientBoostingModel, encoder_names: &[&str]) -> Result<()> {
    let model_names = model.feature_names();
    if model_names.len() != encoder_names.len() {
        return Err(InferenceError::FeatureMismatch(format!(
            "model expects {} features, encoder produces {}",
            model_names.len(),
            encoder_names.len()
        )));
    }
    if let Some((idx, (expected, actual))) = model_names
        .iter()
        .zip(encoder_names)
        .enumerate()
        .find(|(_, (expected, actual))| expected.as_str() != **actual)
    {
        return Err(InferenceError::FeatureMismatch(format!(
            "feature {} is '{}' in the model but '{}' in the encoder",
            idx, expected, actual
        )));
    }
    Ok(())
}
