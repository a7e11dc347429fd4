use criterion::Criterion;
use std::hint::black_box;

use libcloud::credential::Anonymous;
use libcloud::error::Error;
use libcloud::http::policy::RetryOptions;
use libcloud::http::response::Response;
use libcloud::network::{Close, Connect, Connection, Read, Write};
use libcloud::platform::Platform;
use libcloud::storage::{BlobClient, BlobClientOptions};

const CREATED: &[u8] = b"HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n";

/// Loopback connection: swallows writes, replays a canned 201.
struct LoopbackConnection {
    read_pos: usize,
}

impl Read for LoopbackConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = &CREATED[self.read_pos..];
        let len = remaining.len().min(buf.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        self.read_pos += len;
        Ok(len)
    }
}

impl Write for LoopbackConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for LoopbackConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for LoopbackConnection {}

struct LoopbackNetwork;

impl Connect for LoopbackNetwork {
    type Connection = LoopbackConnection;
    type Error = Error;

    fn connect(&mut self, _remote: &str) -> Result<Self::Connection, Self::Error> {
        Ok(LoopbackConnection { read_pos: 0 })
    }
}

struct NullPlatform;

impl Platform for NullPlatform {
    fn clock_msec(&mut self) -> u64 {
        0
    }

    fn sleep_msec(&mut self, _msec: u64) {}
}

pub fn bench_upload(c: &mut Criterion) {
    let mut client = BlobClient::init(
        "https://acct.blob.core.windows.net/container/blob",
        Anonymous,
        LoopbackNetwork,
        NullPlatform,
        BlobClientOptions::default(),
    )
    .unwrap();
    let body = [0x55u8; 256];

    c.bench_function("blob_upload_loopback", |b| {
        b.iter(|| {
            let mut response = Response::new();
            client
                .upload(black_box(&body), None, &mut response)
                .unwrap();
            black_box(response.status_code)
        })
    });
}

pub fn bench_retry_delay(c: &mut Criterion) {
    let options = RetryOptions::default();
    c.bench_function("retry_delay_for_attempt", |b| {
        b.iter(|| {
            let mut total = 0u64;
            for attempt in 0..32 {
                total = total.wrapping_add(options.delay_for_attempt(black_box(attempt)));
            }
            black_box(total)
        })
    });
}
