use std::rc::Rc;
use ndarray::Array2;
use ndarray_stats::QuantileExt;
use rerun::{RecordingStream, TensorData, TextLog};

/// Diagnostics sink injected into the gridders.
pub trait Stream {
    fn stream_message(&self, path: &str, message: &str);

    fn stream_scalar(&self, path: &str, scalar: f64);

    fn stream_surface(&self, path: &str, values: &Array2<f64>);
}

/// `None` is the silent default.
pub type SharedStream = Option<Rc<dyn Stream>>;

impl Stream for Option<Rc<dyn Stream>> {
    fn stream_message(&self, path: &str, message: &str) {
        if let Some(stream) = self {
            stream.stream_message(path, message)
        }
    }

    fn stream_scalar(&self, path: &str, scalar: f64) {
        if let Some(stream) = self {
            stream.stream_scalar(path, scalar)
        }
    }

    fn stream_surface(&self, path: &str, values: &Array2<f64>) {
        if let Some(stream) = self {
            stream.stream_surface(path, values)
        }
    }
}

/// One line summary of an array, NaN values skipped.
pub fn describe<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a f64>,
{
    let finite: Vec<f64> = values.into_iter().copied().filter(|v| !v.is_nan()).collect();
    if finite.is_empty() {
        return "empty".to_string();
    }
    let array = ndarray::Array1::from(finite);
    let min = *array.min_skipnan();
    let max = *array.max_skipnan();
    let mean = array.mean().unwrap_or(f64::NAN);
    format!("n {} min {:.4} max {:.4} mean {:.4}", array.len(), min, max, mean)
}

/// Forwards to the `log` facade.
pub struct LogStream;

impl Stream for LogStream {
    fn stream_message(&self, path: &str, message: &str) {
        log::info!("[{}] {}", path, message);
    }

    fn stream_scalar(&self, path: &str, scalar: f64) {
        log::debug!("[{}] {}", path, scalar);
    }

    fn stream_surface(&self, path: &str, values: &Array2<f64>) {
        log::debug!("[{}] surface {:?}: {}", path, values.dim(), describe(values.iter()));
    }
}

pub struct RerunStream {
    pub stream: RecordingStream,
}

impl RerunStream {
    pub fn new(stream: RecordingStream) -> Self {
        Self { stream }
    }
}

impl Stream for RerunStream {
    fn stream_message(&self, path: &str, message: &str) {
        if let Err(err) = self.stream.log(path, &TextLog::new(message)) {
            log::warn!("Failed to stream message to {}: {}", path, err);
        }
    }

    fn stream_scalar(&self, path: &str, scalar: f64) {
        if let Err(err) = self.stream.log(path, &rerun::Scalar::new(scalar)) {
            log::warn!("Failed to stream scalar to {}: {}", path, err);
        }
    }

    fn stream_surface(&self, path: &str, values: &Array2<f64>) {
        // Rows of the image are map rows, so transpose (ncol, nrow)
        let raster = values.t().to_owned();
        match TensorData::try_from(raster) {
            Ok(data) => {
                if let Err(err) = self.stream.log(path, &rerun::Tensor::new(data)) {
                    log::warn!("Failed to stream surface to {}: {}", path, err);
                }
            }
            Err(err) => log::warn!("Could not convert surface for {}: {}", path, err),
        }
    }
}

/// Keeps every message, for asserting on what a gridder reported.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryStream {
    pub(crate) messages: std::cell::RefCell<Vec<(String, String)>>,
    pub(crate) surfaces: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl MemoryStream {
    pub(crate) fn contains(&self, path: &str, fragment: &str) -> bool {
        self.messages.borrow().iter().any(|(p, m)| p == path && m.contains(fragment))
    }
}

#[cfg(test)]
impl Stream for MemoryStream {
    fn stream_message(&self, path: &str, message: &str) {
        self.messages.borrow_mut().push((path.to_string(), message.to_string()));
    }

    fn stream_scalar(&self, path: &str, scalar: f64) {
        self.messages.borrow_mut().push((path.to_string(), scalar.to_string()));
    }

    fn stream_surface(&self, path: &str, _values: &Array2<f64>) {
        self.surfaces.borrow_mut().push(path.to_string());
    }
}
