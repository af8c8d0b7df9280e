use std::collections::BTreeMap;
use std::io::{self, Write};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};
use flate2::write::GzEncoder;
use flate2::Compression;

pub struct CompressTask {
    pub id: usize,
    pub data: Vec<u8>,
}

pub struct CompressedResult {
    pub id: usize,
    pub data: io::Result<Vec<u8>>,
}

/// Gzip one buffer into a standalone member.
pub fn gzip_member(data: &[u8], level: u32) -> io::Result<Vec<u8>> {
    let mut enc = GzEncoder::new(Vec::with_capacity(data.len() / 3), Compression::new(level));
    enc.write_all(data)?;
    enc.finish()
}

/// Worker threads that gzip buffers. Results come back through
/// [`CompressionPool::next_in_order`] in submission order no matter which
/// worker finishes first.
pub struct CompressionPool {
    tx: Option<Sender<CompressTask>>,
    rx: Receiver<CompressedResult>,
    workers: Vec<JoinHandle<()>>,
    pending: BTreeMap<usize, io::Result<Vec<u8>>>,
    next_id: usize,
    submitted: usize,
}

impl CompressionPool {
    pub fn new(threads: usize, level: u32) -> Self {
        let (tx, worker_rx) = unbounded::<CompressTask>();
        let (worker_tx, rx) = unbounded::<CompressedResult>();
        let workers = (0..threads.max(1))
            .map(|_| {
                let rx = worker_rx.clone();
                let tx = worker_tx.clone();
                thread::spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let data = gzip_member(&task.data, level);
                        if tx.send(CompressedResult { id: task.id, data }).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();
        Self {
            tx: Some(tx),
            rx,
            workers,
            pending: BTreeMap::new(),
            next_id: 0,
            submitted: 0,
        }
    }

    /// Queue a buffer; ids are handed out sequentially from 0.
    pub fn submit(&mut self, data: Vec<u8>) -> usize {
        let id = self.submitted;
        if let Some(tx) = &self.tx {
            // workers only hang up after the pool is dropped
            let _ = tx.send(CompressTask { id, data });
        }
        self.submitted += 1;
        id
    }

    /// Block until the next result in submission order is ready.
    /// `None` once every submitted buffer has been returned.
    pub fn next_in_order(&mut self) -> Option<io::Result<Vec<u8>>> {
        if self.next_id == self.submitted {
            return None;
        }
        loop {
            if let Some(data) = self.pending.remove(&self.next_id) {
                self.next_id += 1;
                return Some(data);
            }
            match self.rx.recv() {
                Ok(res) => {
                    self.pending.insert(res.id, res.data);
                }
                Err(_) => {
                    self.next_id += 1;
                    return Some(Err(io::Error::new(
                        io::ErrorKind::Other,
                        "compression worker exited early",
                    )));
                }
            }
        }
    }
}

impl Drop for CompressionPool {
    fn drop(&mut self) {
        // closing the task channel lets the workers drain and exit
        self.tx.take();
        for w in self.workers.drain(..) {
            let _ = w.join();
        }
    }
}
