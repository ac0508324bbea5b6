//! Length-prefixed frame codec.
//!
//! Every frame on the wire is `u32_be length || length bytes payload`. No
//! magic, no version, no checksum.

use std::{
    io::{Read, Write},
    net::TcpStream,
    time::{Duration, Instant},
};

use crate::error::FrameError;

const LEN_HEADER_SIZE: usize = 4;

/// Reads exactly `buf.len()` bytes off `sock`, timing the whole read against
/// `deadline` rather than per-syscall, so a peer trickling bytes one at a
/// time still gets cut off promptly.
fn recvall(sock: &mut TcpStream, buf: &mut [u8], deadline: Duration) -> Result<(), FrameError> {
    let start = Instant::now();
    let mut filled = 0;

    while filled < buf.len() {
        let elapsed = start.elapsed();
        if elapsed >= deadline {
            return Err(FrameError::Timeout(buf.len() - filled));
        }
        sock.set_read_timeout(Some(deadline - elapsed))?;

        match sock.read(&mut buf[filled..]) {
            Ok(0) => return Err(FrameError::Closed),
            Ok(n) => filled += n,
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                return Err(FrameError::Timeout(buf.len() - filled));
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

/// Reads one length-prefixed frame, waiting no more than `deadline` in total.
///
/// A declared length of zero is rejected: the protocol never has a reason to
/// send an empty payload, and accepting one would let a misbehaving peer spin
/// the connection loop without making any progress.
pub fn recv_frame(sock: &mut TcpStream, deadline: Duration) -> Result<Vec<u8>, FrameError> {
    let start = Instant::now();

    let mut header = [0u8; LEN_HEADER_SIZE];
    recvall(sock, &mut header, deadline)?;
    let len = u32::from_be_bytes(header) as usize;
    if len == 0 {
        return Err(FrameError::EmptyFrame);
    }

    let remaining = deadline.saturating_sub(start.elapsed());
    let mut payload = vec![0u8; len];
    recvall(sock, &mut payload, remaining)?;
    Ok(payload)
}

/// Writes one length-prefixed frame. The header and payload are concatenated
/// into a single buffer before hitting the socket so the write is observable
/// as one atomic send.
pub fn send_frame(sock: &mut TcpStream, payload: &[u8]) -> Result<(), FrameError> {
    let mut buf = Vec::with_capacity(LEN_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(payload);
    sock.write_all(&buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{net::TcpListener, thread};

    use super::*;

    #[test]
    fn roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let payload = b"hello VOEvent world".to_vec();

        let sent = payload.clone();
        let writer = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            send_frame(&mut sock, &sent).unwrap();
        });

        let mut sock = TcpStream::connect(addr).unwrap();
        let received = recv_frame(&mut sock, Duration::from_secs(5)).unwrap();
        writer.join().unwrap();

        assert_eq!(received, payload);
    }

    #[test]
    fn empty_frame_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let writer = thread::spawn(move || {
            let (mut sock, _) = listener.accept().unwrap();
            sock.write_all(&0u32.to_be_bytes()).unwrap();
        });

        let mut sock = TcpStream::connect(addr).unwrap();
        let err = recv_frame(&mut sock, Duration::from_secs(5)).unwrap_err();
        writer.join().unwrap();

        assert!(matches!(err, FrameError::EmptyFrame));
    }

    #[test]
    fn orderly_shutdown_is_closed_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let writer = thread::spawn(move || {
            let (sock, _) = listener.accept().unwrap();
            drop(sock);
        });

        let mut sock = TcpStream::connect(addr).unwrap();
        let err = recv_frame(&mut sock, Duration::from_secs(5)).unwrap_err();
        writer.join().unwrap();

        assert!(matches!(err, FrameError::Closed));
    }

    #[test]
    fn times_out_on_silent_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let writer = thread::spawn(move || {
            let (sock, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(300));
            drop(sock);
        });

        let mut sock = TcpStream::connect(addr).unwrap();
        let err = recv_frame(&mut sock, Duration::from_millis(50)).unwrap_err();
        writer.join().unwrap();

        assert!(matches!(err, FrameError::Timeout(_)));
    }
}
