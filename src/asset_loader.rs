//! Background loading on the rayon pool. Each job reports back through a channel and
//! finished results are picked up once per frame.

use std::sync::mpsc::{self, Receiver, Sender};

type LoadResult<T> = (String, anyhow::Result<T>);

pub struct AssetLoader<T: Send + 'static> {
    sender: Sender<LoadResult<T>>,
    receiver: Receiver<LoadResult<T>>,
    pending: usize,
}

impl<T: Send + 'static> AssetLoader<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: 0,
        }
    }

    pub fn load<F>(&mut self, name: impl Into<String>, job: F)
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let name = name.into();
        let sender = self.sender.clone();
        self.pending += 1;

        log::debug!("Loading {}", name);

        rayon::spawn(move || {
            let result = job();
            // The receiver only goes away when the app is shutting down
            let _ = sender.send((name, result));
        });
    }

    /// Number of jobs that haven't been drained yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Successful loads finished since the last call. Failures are logged and skipped.
    pub fn drain(&mut self) -> Vec<(String, T)> {
        let mut finished = Vec::new();

        while let Ok((name, result)) = self.receiver.try_recv() {
            self.pending -= 1;
            self.handle(name, result, &mut finished);
        }

        finished
    }

    fn handle(&self, name: String, result: anyhow::Result<T>, finished: &mut Vec<(String, T)>) {
        match result {
            Ok(asset) => {
                log::info!("Loaded {}", name);
                finished.push((name, asset));
            }
            Err(e) => log::error!("Failed to load {}: {:#}", name, e),
        }
    }

    #[cfg(test)]
    fn wait_all(&mut self) -> Vec<(String, T)> {
        let mut finished = Vec::new();
        while self.pending > 0 {
            let (name, result) = self.receiver.recv().unwrap();
            self.pending -= 1;
            self.handle(name, result, &mut finished);
        }
        finished
    }
}

impl<T: Send + 'static> Default for AssetLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_results_in_any_order() {
        let mut loader = AssetLoader::new();
        for i in 0..8 {
            loader.load(format!("asset{i}"), move || Ok(i * 2));
        }
        assert_eq!(loader.pending(), 8);

        let mut results: Vec<i32> = loader.wait_all().into_iter().map(|(_, v)| v).collect();
        results.sort();
        assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);
        assert_eq!(loader.pending(), 0);
        assert!(loader.drain().is_empty());
    }

    #[test]
    fn failures_are_skipped() {
        let mut loader: AssetLoader<u32> = AssetLoader::new();
        loader.load("broken", || anyhow::bail!("missing file"));
        loader.load("fine", || Ok(7));

        let results = loader.wait_all();
        assert_eq!(results, vec![("fine".to_string(), 7)]);
    }
}
