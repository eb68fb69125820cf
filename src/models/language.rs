use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  variable::Variable,
  dataset::LanguageDataset,
  models::{ Model, Parameterized },
  train::TrainConfig,
};


/// Identifies the language of single words with a recurrent network.
///
/// Characters are read left to right, folding every one-hot character
/// into a hidden state:
///
/// ```text
/// h₀ = relu(x₀·w1)
/// hᵢ = relu(xᵢ·w1) + relu(hᵢ₋₁·wh)
/// ```
///
/// The final state is projected onto one score per language.

#[derive(Debug, Clone)]
pub struct LanguageIdModel {
  num_chars: usize,
  languages: Vec<String>,
  w1: Variable<f32>,
  wh: Variable<f32>,
  w2: Variable<f32>,
}

impl LanguageIdModel {
  pub const NUM_CHARS: usize = 47;
  pub const LANGUAGES: [&'static str; 5] = ["English", "Spanish", "Finnish", "Dutch", "Polish"];
  pub const HIDDEN: usize = 100;

  pub fn new() -> Self {
    let languages = Self::LANGUAGES.iter().map(|l| l.to_string() ).collect();
    Self::with_sizes(Self::NUM_CHARS, languages, Self::HIDDEN)
  }

  pub fn with_sizes(num_chars: usize, languages: Vec<String>, hidden: usize) -> Self {
    Self {
      w1: Variable::parameter(num_chars, hidden),
      wh: Variable::parameter(hidden, hidden),
      w2: Variable::parameter(hidden, languages.len()),
      num_chars,
      languages,
    }
  }

  /// Size the model to a corpus' alphabet and languages.

  pub fn for_dataset(dataset: &LanguageDataset) -> Self {
    Self::with_sizes(dataset.num_chars(), dataset.languages().to_vec(), Self::HIDDEN)
  }

  pub fn num_chars(&self) -> usize {
    self.num_chars
  }

  pub fn languages(&self) -> &[String] {
    &self.languages
  }

  pub fn language(&self, index: usize) -> Option<&str> {
    self.languages.get(index).map(|l| l.as_str() )
  }
}

impl Default for LanguageIdModel {
  fn default() -> Self {
    Self::new()
  }
}

impl Parameterized for LanguageIdModel {
  fn name(&self) -> &'static str {
    "language-id"
  }

  fn parameters(&self) -> Vec<&Variable<f32>> {
    vec![&self.w1, &self.wh, &self.w2]
  }
}

impl Model for LanguageIdModel {
  type Input = Vec<Tensor<f32>>;

  /// Scores for a batch of equally long words, given as one
  /// `batch × num_chars` tensor per character position.

  fn run(&self, xs: &Vec<Tensor<f32>>) -> Result<Variable<f32>> {
    let Some((first, rest)) = xs.split_first() else {
      return Err(Error::Format { what: "word batch", message: "words need at least one character".to_string() })
    };
    let mut h = first.tracked().linear(&self.w1)?.relu();
    for x in rest {
      let input = x.tracked().linear(&self.w1)?.relu();
      h = input.add(&h.linear(&self.wh)?.relu())?;
    }
    h.linear(&self.w2)
  }

  fn get_loss(&self, xs: &Vec<Tensor<f32>>, y: &Tensor<f32>) -> Result<Variable<f32>> {
    self.run(xs)?.softmax_loss(&y.tracked())
  }

  fn training_config(&self) -> TrainConfig {
    TrainConfig::language_id()
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::dataset::Dataset;

  const CORPUS: &str = "\
train\tab\taaa
train\tab\tbbb
train\tcd\tccc
train\tcd\tddd
train\tab\tab
train\tcd\tcd
dev\tab\tba
dev\tcd\tdc
";

  #[test]
  fn defaults() {
    let model = LanguageIdModel::new();
    assert_eq!(model.num_chars(), 47);
    assert_eq!(model.language(2), Some("Finnish"));
    assert_eq!(model.language(5), None);
    let xs = vec![Tensor::zeros(4, 47); 6];
    assert_eq!(model.run(&xs).unwrap().shape(), crate::Shape::new(4, 5));
    assert!(model.run(&vec![]).is_err());
  }

  #[test]
  fn separates_alphabets() {
    crate::seed(6);
    let mut data = LanguageDataset::from_tsv(CORPUS).unwrap().with_seed(6);
    let model = LanguageIdModel::for_dataset(&data);
    assert_eq!(model.parameters()[0].shape(), crate::Shape::new(4, 100));
    let config = model.training_config().batch(crate::BatchSize::Fixed(2)).max_epochs(200);
    let report = crate::train::train(&model, &mut data, &config).unwrap();
    assert!(report.converged);
    let xs = data.encode(&["aab", "dcd"]).unwrap();
    assert_eq!(model.predict(&xs).unwrap(), vec![0, 1]);
  }
}
