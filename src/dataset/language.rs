use std::fs;
use std::path::Path;

use itertools::Itertools;
use rand::{Rng, SeedableRng, rngs::StdRng, distributions::{Distribution, WeightedIndex}};

use crate::{
  error::{ Error, Result },
  tensor::Tensor,
  dataset::{ Batch, Dataset, seeded_rng },
};


/// A word encoded as alphabet indices, with its language index.

type Example = (Vec<usize>, usize);


/// Single words labeled with the language they come from.
///
/// A batch of words of length `L` is presented to a model as `L` tensors of
/// shape `batch × alphabet`, each row one-hot encoding the character at that
/// position. Words inside a batch therefore always share the same length.

#[derive(Debug, Clone)]
pub struct LanguageDataset {
  alphabet: Vec<char>,
  languages: Vec<String>,
  train: Vec<Example>,
  buckets: Vec<Vec<usize>>,
  validation: Vec<Example>,
  test: Vec<Example>,
  rng: StdRng,
}

impl LanguageDataset {
  pub fn new(
    alphabet: Vec<char>,
    languages: Vec<String>,
    train: &[(String, usize)],
    validation: &[(String, usize)],
    test: &[(String, usize)],
  ) -> Result<Self> {
    let mut dataset = Self {
      alphabet,
      languages,
      train: vec![],
      buckets: vec![],
      validation: vec![],
      test: vec![],
      rng: seeded_rng(),
    };
    dataset.train = dataset.encode_all(train)?;
    dataset.validation = dataset.encode_all(validation)?;
    dataset.test = dataset.encode_all(test)?;
    dataset.buckets = Self::buckets(&dataset.train);
    Ok(dataset)
  }

  /// Parse `split<TAB>language<TAB>word` lines, where split is one of
  /// `train`, `dev` or `test`.
  ///
  /// The alphabet becomes the sorted set of all characters seen and
  /// languages are numbered in order of first appearance.

  pub fn from_tsv(text: &str) -> Result<Self> {
    let mut languages: Vec<String> = vec![];
    let mut splits: [Vec<(String, usize)>; 3] = Default::default();
    for (number, line) in text.lines().enumerate() {
      let line = line.trim_end_matches('\r');
      if line.trim().is_empty() { continue }
      let fields: Vec<&str> = line.split('\t').collect();
      let &[split, language, word] = fields.as_slice() else {
        return Err(Error::Format {
          what: "language corpus",
          message: format!("line {} needs three tab separated fields", number + 1),
        })
      };
      let split = match split {
        "train" => 0,
        "dev" => 1,
        "test" => 2,
        other => return Err(Error::Format {
          what: "language corpus",
          message: format!("line {}: unknown split {other:?}", number + 1),
        }),
      };
      let label = match languages.iter().position(|l| l == language ) {
        Some(label) => label,
        None => {
          languages.push(language.to_string());
          languages.len() - 1
        },
      };
      splits[split].push((word.to_string(), label));
    }
    let alphabet = splits.iter()
      .flatten()
      .flat_map(|(word, _)| word.chars() )
      .unique()
      .sorted()
      .collect();
    let [train, validation, test] = splits;
    Self::new(alphabet, languages, &train, &validation, &test)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let dataset = Self::from_tsv(&fs::read_to_string(path)?)?;
    log::info!("Loaded {} training words in {} languages over {} characters from {}",
      dataset.len(), dataset.languages.len(), dataset.alphabet.len(), path.display());
    Ok(dataset)
  }

  pub fn with_seed(mut self, seed: u64) -> Self {
    self.rng = StdRng::seed_from_u64(seed);
    self
  }

  pub fn alphabet(&self) -> &[char] {
    &self.alphabet
  }

  pub fn num_chars(&self) -> usize {
    self.alphabet.len()
  }

  pub fn languages(&self) -> &[String] {
    &self.languages
  }

  /// Encode words of equal length as one tensor per character position.

  pub fn encode(&self, words: &[&str]) -> Result<Vec<Tensor<f32>>> {
    let encoded = words.iter()
      .map(|word| self.encode_word(word) )
      .collect::<Result<Vec<_>>>()?;
    let examples: Vec<Example> = encoded.into_iter().map(|chars| (chars, 0) ).collect();
    let ids: Vec<usize> = (0..examples.len()).collect();
    Ok(self.batch(&examples, &ids)?.0)
  }

  fn encode_word(&self, word: &str) -> Result<Vec<usize>> {
    if word.is_empty() {
      return Err(Error::Format { what: "word", message: "words must not be empty".to_string() })
    }
    word.chars()
      .map(|c| self.alphabet.iter().position(|&a| a == c ).ok_or(Error::UnknownCharacter(c)) )
      .collect()
  }

  fn encode_all(&self, words: &[(String, usize)]) -> Result<Vec<Example>> {
    words.iter()
      .map(|(word, label)| {
        if *label >= self.languages.len() {
          return Err(Error::Format {
            what: "language label",
            message: format!("{label} is out of range for {} languages", self.languages.len()),
          })
        }
        Ok((self.encode_word(word)?, *label))
      })
      .collect()
  }

  // Example ids grouped by word length, shortest first
  fn buckets(examples: &[Example]) -> Vec<Vec<usize>> {
    examples.iter()
      .enumerate()
      .map(|(i, (chars, _))| (chars.len(), i) )
      .into_group_map()
      .into_iter()
      .sorted_by_key(|(len, _)| *len )
      .map(|(_, ids)| ids )
      .collect()
  }

  fn batch(&self, examples: &[Example], ids: &[usize]) -> Result<Batch<Vec<Tensor<f32>>>> {
    let length = ids.first().map(|&i| examples[i].0.len() ).unwrap_or(0);
    if ids.iter().any(|&i| examples[i].0.len() != length ) {
      return Err(Error::Format { what: "batch", message: "words differ in length".to_string() })
    }
    let xs = (0..length)
      .map(|t| {
        let chars: Vec<usize> = ids.iter().map(|&i| examples[i].0[t] ).collect();
        Tensor::one_hot(&chars, self.alphabet.len())
      })
      .collect::<Result<Vec<_>>>()?;
    let labels: Vec<usize> = ids.iter().map(|&i| examples[i].1 ).collect();
    Ok((xs, Tensor::one_hot(&labels, self.languages.len())?))
  }

  fn evaluation_batches(&self, examples: &[Example], split: &'static str) -> Result<Vec<Batch<Vec<Tensor<f32>>>>> {
    if examples.is_empty() { return Err(Error::MissingSplit(split)) }
    Self::buckets(examples)
      .iter()
      .map(|ids| self.batch(examples, ids) )
      .collect()
  }
}

impl Dataset for LanguageDataset {
  type Input = Vec<Tensor<f32>>;

  fn len(&self) -> usize {
    self.train.len()
  }

  /// Every batch comes from a single length bucket, picked with probability
  /// proportional to its size, and samples its words with replacement.

  fn iterate_once(&mut self, batch_size: usize) -> Result<Vec<Batch<Vec<Tensor<f32>>>>> {
    let len = self.len();
    if len == 0 { return Err(Error::EmptyDataset) }
    if batch_size == 0 || batch_size > len {
      return Err(Error::BatchSize { len, batch_size })
    }
    let weights = self.buckets.iter().map(|ids| ids.len() );
    let buckets = WeightedIndex::new(weights).map_err(|_| Error::EmptyDataset )?;
    let mut picks = Vec::with_capacity(len / batch_size);
    for _ in 0..len / batch_size {
      let bucket = &self.buckets[buckets.sample(&mut self.rng)];
      let ids: Vec<usize> = (0..batch_size)
        .map(|_| bucket[self.rng.gen_range(0, bucket.len())] )
        .collect();
      picks.push(ids);
    }
    picks.iter()
      .map(|ids| self.batch(&self.train, ids) )
      .collect()
  }

  fn training_set(&self) -> Result<Vec<Batch<Vec<Tensor<f32>>>>> {
    if self.train.is_empty() { return Err(Error::EmptyDataset) }
    self.evaluation_batches(&self.train, "training")
  }

  fn validation_set(&self) -> Result<Vec<Batch<Vec<Tensor<f32>>>>> {
    self.evaluation_batches(&self.validation, "validation")
  }

  fn test_set(&self) -> Result<Vec<Batch<Vec<Tensor<f32>>>>> {
    self.evaluation_batches(&self.test, "test")
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  const CORPUS: &str = "\
train\tenglish\tcat
train\tenglish\tdog
train\tspanish\tgato
train\tspanish\tperro
train\tenglish\thorse
dev\tspanish\tpato
dev\tenglish\tcow
test\tenglish\tdoe
";

  #[test]
  fn parse_corpus() {
    let data = LanguageDataset::from_tsv(CORPUS).unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data.languages(), &["english".to_string(), "spanish".to_string()]);
    assert_eq!(data.alphabet(), &['a', 'c', 'd', 'e', 'g', 'h', 'o', 'p', 'r', 's', 't', 'w']);
  }

  #[test]
  fn encoding() {
    let data = LanguageDataset::from_tsv(CORPUS).unwrap();
    let xs = data.encode(&["cat", "dog"]).unwrap();
    assert_eq!(xs.len(), 3);
    assert_eq!(xs[0].shape(), crate::Shape::new(2, 12));
    assert_eq!(xs[0].argmax_rows(), vec![1, 2]);
    assert_eq!(xs[2].argmax_rows(), vec![10, 4]);
    assert!(data.encode(&["cat", "goat"]).is_err());
    assert!(matches!(data.encode(&["zebra"]), Err(Error::UnknownCharacter('z'))));
  }

  #[test]
  fn batches_share_length() {
    let mut data = LanguageDataset::from_tsv(CORPUS).unwrap().with_seed(1);
    let batches = data.iterate_once(2).unwrap();
    assert_eq!(batches.len(), 2);
    for (xs, y) in &batches {
      assert_eq!(y.rows(), 2);
      assert!(xs.iter().all(|x| x.rows() == 2 ));
      assert!(xs.len() >= 3 && xs.len() <= 5);
    }
    assert!(data.iterate_once(6).is_err());
  }

  #[test]
  fn evaluation_splits() {
    let data = LanguageDataset::from_tsv(CORPUS).unwrap();
    // Lengths 3, 4 & 5 in training
    assert_eq!(data.training_set().unwrap().len(), 3);
    let validation = data.validation_set().unwrap();
    assert_eq!(validation.len(), 2);
    assert_eq!(validation.iter().map(|(_, y)| y.rows() ).sum::<usize>(), 2);
    assert_eq!(data.test_set().unwrap().len(), 1);
  }

  #[test]
  fn malformed_corpus() {
    assert!(LanguageDataset::from_tsv("train\tenglish").is_err());
    assert!(LanguageDataset::from_tsv("holdout\tenglish\tcat").is_err());
    assert!(LanguageDataset::from_tsv("train\tenglish\t").is_err());
  }
}
