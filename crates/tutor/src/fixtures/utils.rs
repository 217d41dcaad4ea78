//
// fixtures/utils.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thebe::comm::comm_channel::CommMsg;
use thebe::socket;

use crate::executor::ExecuteError;
use crate::executor::ExecuteRequest;
use crate::executor::RuntimeExecutor;
use crate::fs::FileSystem;

type ExecuteHandler = Box<dyn Fn(&ExecuteRequest) -> Result<(), ExecuteError> + Send + Sync>;

struct FakeExecutorInner {
    requests: Mutex<Vec<ExecuteRequest>>,
    handler: ExecuteHandler,
}

/// A scripted stand-in for the host runtime. Records every request and
/// answers with whatever its handler decides.
#[derive(Clone)]
pub struct FakeExecutor {
    inner: Arc<FakeExecutorInner>,
}

impl FakeExecutor {
    /// An executor that accepts everything.
    pub fn accepting() -> Self {
        Self::with_handler(|_| Ok(()))
    }

    pub fn with_handler(
        handler: impl Fn(&ExecuteRequest) -> Result<(), ExecuteError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(FakeExecutorInner {
                requests: Mutex::new(vec![]),
                handler: Box::new(handler),
            }),
        }
    }

    /// The requests submitted so far, in order.
    pub fn requests(&self) -> Vec<ExecuteRequest> {
        self.inner.requests.lock().unwrap().clone()
    }
}

impl RuntimeExecutor for FakeExecutor {
    fn execute(&self, request: &ExecuteRequest) -> Result<(), ExecuteError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        (self.inner.handler)(request)
    }
}

struct FakeFileSystemInner {
    files: Mutex<HashMap<PathBuf, String>>,
    read_failures: Mutex<HashMap<PathBuf, (usize, io::ErrorKind)>>,
    writes: Mutex<Vec<PathBuf>>,
    removals: Mutex<Vec<PathBuf>>,
}

/// An in-memory file system that records what was written and removed, and
/// can be told to fail reads.
#[derive(Clone)]
pub struct FakeFileSystem {
    inner: Arc<FakeFileSystemInner>,
}

impl FakeFileSystem {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FakeFileSystemInner {
                files: Mutex::new(HashMap::new()),
                read_failures: Mutex::new(HashMap::new()),
                writes: Mutex::new(vec![]),
                removals: Mutex::new(vec![]),
            }),
        }
    }

    /// Seed a file without recording it as a write.
    pub fn put(&self, path: &Path, contents: &str) {
        self.inner
            .files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), String::from(contents));
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        self.inner.files.lock().unwrap().get(path).cloned()
    }

    /// Make the next `count` reads of `path` fail with `kind`.
    pub fn fail_next_reads(&self, path: &Path, count: usize, kind: io::ErrorKind) {
        self.inner
            .read_failures
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), (count, kind));
    }

    pub fn writes(&self) -> Vec<PathBuf> {
        self.inner.writes.lock().unwrap().clone()
    }

    pub fn removals(&self) -> Vec<PathBuf> {
        self.inner.removals.lock().unwrap().clone()
    }
}

impl Default for FakeFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for FakeFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mut failures = self.inner.read_failures.lock().unwrap();
        if let Some((count, kind)) = failures.get_mut(path) {
            if *count > 0 {
                *count -= 1;
                return Err(io::Error::from(*kind));
            }
        }
        drop(failures);

        match self.inner.files.lock().unwrap().get(path) {
            Some(contents) => Ok(contents.clone()),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.inner.writes.lock().unwrap().push(path.to_path_buf());
        self.inner
            .files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), String::from(contents));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.inner
            .removals
            .lock()
            .unwrap()
            .push(path.to_path_buf());
        match self.inner.files.lock().unwrap().remove(path) {
            Some(_) => Ok(()),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

pub fn socket_rpc_request<'de, RequestType, ReplyType>(
    socket: &socket::comm::CommSocket,
    req: RequestType,
) -> ReplyType
where
    RequestType: Serialize,
    ReplyType: DeserializeOwned,
{
    // Randomly generate a unique ID for this request.
    let id = uuid::Uuid::new_v4().to_string();

    // Serialize the message for the wire
    let json = serde_json::to_value(req).unwrap();
    println!("--> {:?}", json);

    // Convert the request to a CommMsg and send it.
    let msg = CommMsg::Rpc(id, json);
    socket.incoming_tx.send(msg).unwrap();
    let msg = socket
        .outgoing_rx
        .recv_timeout(std::time::Duration::from_secs(1))
        .unwrap();

    // Extract the reply from the CommMsg.
    match msg {
        CommMsg::Rpc(_id, value) => {
            println!("<-- {:?}", value);
            let reply = serde_json::from_value(value).unwrap();
            reply
        },
        _ => panic!("Unexpected Comm Message"),
    }
}
