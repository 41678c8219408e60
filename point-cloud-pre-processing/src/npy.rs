//! NumPy `.npy` arrays through `npyz`.
//!
//! Training arrays are written C-ordered with their default dtype. Reading
//! covers integer label vectors, which is what prediction files hold.
use crate::error::{PreprocessError, Result};
use npyz::{AutoSerialize, DType, Deserialize, NpyFile, Order, TypeChar, WriteOptions, WriterBuilder};
use std::fmt::Display;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

fn npy_error(path: &Path, err: impl Display) -> PreprocessError {
    PreprocessError::Npy(format!("{}: {err}", path.display()))
}

fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [n] => format!("({n},)"),
        dims => {
            let parts: Vec<String> = dims.iter().map(usize::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Writes `data` as an array of the given shape.
pub fn write_npy<T>(path: &Path, shape: &[usize], data: &[T]) -> Result<()>
where
    T: AutoSerialize + Copy,
{
    let expected: usize = shape.iter().product();
    if expected != data.len() {
        return Err(PreprocessError::Npy(format!(
            "shape {} needs {expected} values, got {}",
            shape_literal(shape),
            data.len()
        )));
    }

    let file = File::create(path).map_err(|e| PreprocessError::io(path, e))?;
    let dims: Vec<u64> = shape.iter().map(|&n| n as u64).collect();
    let mut writer = WriteOptions::<T>::new()
        .default_dtype()
        .shape(&dims)
        .writer(BufWriter::new(file))
        .begin_nd()
        .map_err(|e| PreprocessError::io(path, e))?;
    writer
        .extend(data.iter().copied())
        .map_err(|e| PreprocessError::io(path, e))?;
    writer.finish().map_err(|e| PreprocessError::io(path, e))
}

/// Reads every value as `V` and narrows it to a `u8` label.
fn narrow_labels<V>(path: &Path, npy: NpyFile<&[u8]>) -> Result<Vec<u8>>
where
    V: Deserialize + TryInto<u8> + Display + Copy,
{
    let values: Vec<V> = npy.into_vec().map_err(|e| npy_error(path, e))?;
    values
        .into_iter()
        .map(|value| {
            value
                .try_into()
                .map_err(|_| npy_error(path, format!("label {value} does not fit in u8")))
        })
        .collect()
}

/// Reads a one-dimensional integer array as `u8` labels.
pub fn read_npy_labels(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|e| PreprocessError::io(path, e))?;
    let npy = NpyFile::new(&bytes[..]).map_err(|e| npy_error(path, e))?;

    match npy.shape() {
        [_] => {}
        [_, 1] if npy.order() == Order::C => {}
        other => {
            return Err(npy_error(
                path,
                format!("expected a label vector, got shape {other:?}"),
            ));
        }
    }

    let DType::Plain(type_str) = npy.dtype() else {
        return Err(npy_error(path, "structured arrays are not labels"));
    };
    match (type_str.type_char(), type_str.size_field()) {
        (TypeChar::Uint, 1) => narrow_labels::<u8>(path, npy),
        (TypeChar::Int, 1) => narrow_labels::<i8>(path, npy),
        (TypeChar::Uint, 2) => narrow_labels::<u16>(path, npy),
        (TypeChar::Int, 2) => narrow_labels::<i16>(path, npy),
        (TypeChar::Uint, 4) => narrow_labels::<u32>(path, npy),
        (TypeChar::Int, 4) => narrow_labels::<i32>(path, npy),
        (TypeChar::Uint, 8) => narrow_labels::<u64>(path, npy),
        (TypeChar::Int, 8) => narrow_labels::<i64>(path, npy),
        _ => Err(npy_error(path, format!("unsupported label dtype '{type_str}'"))),
    }
}
