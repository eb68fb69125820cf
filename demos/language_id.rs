// Identifies the language of single words with a recurrent network.
// Expects a tab separated corpus of `split, language, word` lines.

use microlearn::{ Model, Dataset, LanguageDataset, LanguageIdModel, train };

fn main() {
  let path = std::env::args().nth(1).unwrap_or_else(|| "data/lang_id.tsv".to_string() );
  let mut data = match LanguageDataset::load(&path) {
    Ok(data) => data,
    Err(err) => {
      eprintln!("Could not load corpus from {path}: {err}");
      std::process::exit(1);
    },
  };
  println!("{} words over {} characters in {:?}", data.len(), data.num_chars(), data.languages());

  let model = LanguageIdModel::for_dataset(&data);
  let report = model.train(&mut data).unwrap();
  println!("Converged after {} epochs", report.epochs);

  if let Ok(test) = data.test_set() {
    println!("Test accuracy: {:.4}", train::accuracy(&model, &test).unwrap());
  }

  for word in ["hello", "hola", "hallo"] {
    match data.encode(&[word]) {
      Ok(xs) => {
        let index = model.predict(&xs).unwrap()[0];
        println!("{word} -> {}", model.language(index).unwrap_or("?"));
      },
      Err(err) => println!("{word}: {err}"),
    }
  }
}
