
use crate::error::WeatError;
use crate::lexicon::WeatTests;
use crate::pipeline::TestOutcome;
use flate2::read::GzDecoder;
use ndarray::Array2;
use ndarray_npy::read_npy;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};


/// A token -> row index map plus the matrix of vectors it indexes into.
#[derive(Clone, Debug)]
pub struct VectorTable {
    pub t2i: HashMap<String, usize>,
    pub w: Array2<f32>,
}

pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item, <R as ReadFile>::Error> {
    let input = <R as ReadFile>::read_file(file_path)?;
    Ok(input)
}

pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: &S) -> Result<(), <S as SaveFile>::Error>
where
    <S as SaveFile>::Error: From<std::io::Error>,
{
    // create output folder
    fs::create_dir_all(output_dir)?;
    item.save_file(output_dir, file_name)?;
    Ok(())
}

pub trait ReadFile {
    type Error;
    type Item;
    fn read_file(file_path: &str) -> Result<Self::Item, Self::Error>;
}

pub trait SaveFile {
    type Error;
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error>;
}

// upper bound on what a binary header may make us reserve up front
const PREALLOCATED_ROWS: usize = 1 << 20;

/// word2vec text layout, `vocab dim` header optional, `.gz` decompressed on the fly.
pub struct Word2VecText;

/// word2vec binary layout: ascii header, then `token<space>` + `dim` little endian f32 per entry.
pub struct Word2VecBinary;

/// A `.npy` matrix with its `words.txt` token map next to it, as written by the GloVe trainer.
pub struct NpyVectors;

impl ReadFile for Word2VecText {
    type Error = WeatError;
    type Item = VectorTable;
    fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {

        let f = File::open(file_path)?;
        let reader: Box<dyn BufRead> = if file_path.ends_with(".gz") {
            Box::new(BufReader::new(GzDecoder::new(f)))
        } else {
            Box::new(BufReader::new(f))
        };

        let mut t2i: HashMap<String, usize> = HashMap::new();
        let mut data: Vec<f32> = Vec::new();
        let mut dim: Option<usize> = None;
        let mut expected: Option<usize> = None;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            // fields are separated by ascii spaces only, other whitespace belongs to the token
            let fields = line.trim_end().split(' ').filter(|f| !f.is_empty()).collect::<Vec<&str>>();
            if fields.is_empty() {
                continue;
            }

            // the first line is either a `vocab dim` header or already a vector (plain GloVe)
            if dim.is_none() {
                let header = match fields.as_slice() {
                    [vocab, d] => vocab.parse::<usize>().ok().zip(d.parse::<usize>().ok()),
                    _ => None,
                };
                if let Some((vocab, d)) = header {
                    expected = Some(vocab);
                    dim = Some(d);
                    continue;
                }
                dim = Some(headerless_dim(&fields));
            }

            let dim = dim.unwrap_or_default();
            if dim == 0 || fields.len() < dim + 1 {
                return Err(WeatError::format(file_path, format!("line {} has {} fields, expected a token and {} values", line_no + 1, fields.len(), dim)));
            }

            // tokens may contain spaces, the values are always the trailing `dim` fields
            let split = fields.len() - dim;
            let token = fields[..split].join(" ");
            if t2i.contains_key(&token) {
                debug!("duplicate token '{}' on line {}, keeping the first vector", token, line_no + 1);
                continue;
            }

            for value in &fields[split..] {
                let value = value.parse::<f32>()
                    .map_err(|e| WeatError::format(file_path, format!("line {}: {}", line_no + 1, e)))?;
                data.push(value);
            }
            let i = t2i.len();
            t2i.insert(token, i);
        }

        if let Some(vocab) = expected {
            if vocab != t2i.len() {
                warn!("{} announces {} tokens but {} were read", file_path, vocab, t2i.len());
            }
        }

        let w = Array2::from_shape_vec((t2i.len(), dim.unwrap_or_default()), data)
            .map_err(|e| WeatError::format(file_path, e.to_string()))?;
        Ok(VectorTable { t2i, w })
    }
}

impl ReadFile for Word2VecBinary {
    type Error = WeatError;
    type Item = VectorTable;
    fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {

        let mut reader = BufReader::new(File::open(file_path)?);

        let mut header = String::new();
        reader.read_line(&mut header)?;
        let (vocab, dim) = match header.split_whitespace().collect::<Vec<&str>>().as_slice() {
            [vocab, dim] => vocab.parse::<usize>().ok().zip(dim.parse::<usize>().ok()),
            _ => None,
        }
        .ok_or_else(|| WeatError::format(file_path, format!("bad header '{}'", header.trim())))?;

        // every entry takes at least its row plus the separating space
        let row_bytes = dim.checked_mul(4)
            .ok_or_else(|| WeatError::format(file_path, format!("dimension {} is too large", dim)))?;
        let payload = vocab.checked_mul(row_bytes + 1)
            .ok_or_else(|| WeatError::format(file_path, format!("header announces {} x {} values, which overflows", vocab, dim)))?;
        let file_size = fs::metadata(file_path)?.len();
        if payload as u64 > file_size {
            return Err(WeatError::format(file_path, format!("header announces {} x {} values, more than the {} bytes in the file", vocab, dim, file_size)));
        }

        let rows = vocab.min(PREALLOCATED_ROWS);
        let mut t2i: HashMap<String, usize> = HashMap::with_capacity(rows);
        let mut data: Vec<f32> = Vec::with_capacity(rows * dim);
        let mut row = vec![0u8; row_bytes];

        for k in 0..vocab {
            let token = read_binary_token(&mut reader)
                .map_err(|e| WeatError::format(file_path, format!("entry {}: {}", k, e)))?;
            reader.read_exact(&mut row)
                .map_err(|e| WeatError::format(file_path, format!("entry {} ('{}'): {}", k, token, e)))?;

            if t2i.contains_key(&token) {
                debug!("duplicate token '{}' in entry {}, keeping the first vector", token, k);
                continue;
            }
            data.extend(row.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])));
            let i = t2i.len();
            t2i.insert(token, i);
        }

        let w = Array2::from_shape_vec((t2i.len(), dim), data)
            .map_err(|e| WeatError::format(file_path, e.to_string()))?;
        Ok(VectorTable { t2i, w })
    }
}

/// Number of values on the first line of a headerless text file: the trailing
/// fields that parse as floats, leaving at least one field for the token.
/// A first token whose last word is itself a number can't be told apart from
/// the values, such files need the `vocab dim` header.
fn headerless_dim(fields: &[&str]) -> usize {
    let numeric = fields.iter().rev().take_while(|f| f.parse::<f32>().is_ok()).count();
    numeric.min(fields.len().saturating_sub(1))
}

fn read_binary_token<R: Read>(reader: &mut R) -> std::io::Result<String> {

    // entries may be separated by a newline, which is not part of the next token
    let mut token: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte)?;
        match byte[0] {
            b' ' => break,
            b'\n' | b'\r' if token.is_empty() => continue,
            b => token.push(b),
        }
    }
    Ok(String::from_utf8_lossy(&token).into_owned())
}

impl ReadFile for NpyVectors {
    type Error = WeatError;
    type Item = VectorTable;
    fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {

        let w: Array2<f32> = read_npy(file_path)?;

        let words_path = Path::new(file_path).with_file_name("words.txt");
        let f = BufReader::new(File::open(&words_path)?);
        let t2i: HashMap<String, usize> = serde_json::from_reader(f)?;
        Ok(VectorTable { t2i, w })
    }
}

impl ReadFile for WeatTests {
    type Error = WeatError;
    type Item = Self;
    fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {
        let f = BufReader::new(File::open(file_path)?);
        let item = serde_json::from_reader(f)?;
        Ok(item)
    }
}

impl SaveFile for Vec<TestOutcome> {
    type Error = WeatError;
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
        let out = output_dir.to_string() + "/" + file_name + ".json";
        let f = BufWriter::new(File::create(out)?);
        serde_json::to_writer_pretty(f, self)?;
        Ok(())
    }
}

impl SaveFile for Vec<String> {
    type Error = WeatError;
    fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
        let out = output_dir.to_string() + "/" + file_name + ".txt";
        let mut f = BufWriter::new(File::create(out)?);
        f.write_all(self.join("\n").as_bytes())?;
        f.flush()?;
        Ok(())
    }
}
