// Classifies MNIST digits. Expects a directory containing the four
// uncompressed IDX files, e.g. `cargo run --release --example digits -- data/mnist`.

use microlearn::{ Model, Dataset, DigitClassificationModel, DigitDataset, train };

fn main() {
  let dir = std::env::args().nth(1).unwrap_or_else(|| "data/mnist".to_string() );
  let mut data = match DigitDataset::load(&dir) {
    Ok(data) => data,
    Err(err) => {
      eprintln!("Could not load MNIST from {dir}: {err}");
      std::process::exit(1);
    },
  };
  println!("Training on {} digits", data.len());

  let model = DigitClassificationModel::new();
  let report = model.train(&mut data).unwrap();
  println!("Validation accuracy per epoch: {:?}", report.history);

  let test = data.test_set().unwrap();
  println!("Test accuracy: {:.4}", train::accuracy(&model, &test).unwrap());

  let Some((images, labels)) = test.first() else { return };
  let predictions = model.predict(images).unwrap();
  let first = |classes: Vec<usize>| classes.into_iter().take(10).collect::<Vec<_>>();
  println!("First predictions {:?}, labels {:?}", first(predictions), first(labels.argmax_rows()));
}
