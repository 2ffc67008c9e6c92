mod util;
use util::*;

use std::time::Duration;

use bytemuck::{Pod, Zeroable, cast_slice};
use brick_decomp::algs::communicator::{CommError, Communicator, LocalComm, NoComm, Wait};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug, PartialEq, Eq)]
struct WireU64 {
    x: u64,
}

#[test]
fn no_comm_is_nop() {
    let comm = NoComm;
    assert!(comm.is_no_comm());
    assert_eq!(comm.irecv(0, 123, 8).wait(), Ok(None));
    assert_eq!(comm.isend(0, 123, &[]).wait(), Ok(None));
}

#[test]
fn local_comm_roundtrip_and_tag_isolation() {
    let comms = LocalComm::group(2);
    let (c0, c1) = (&comms[0], &comms[1]);

    const TAG_A: u16 = 0xA100;
    const TAG_B: u16 = 0xB200;
    let len = std::mem::size_of::<WireU64>();

    let rxa = c1.irecv(0, TAG_A, len);
    let rxb = c1.irecv(0, TAG_B, len);

    let wa = [WireU64 {
        x: 0xDEAD_BEEF_F00D_F00D,
    }];
    let wb = [WireU64 {
        x: 0x0123_4567_89AB_CDEF,
    }];
    c0.isend(1, TAG_B, cast_slice(&wb)).wait().unwrap();
    c0.isend(1, TAG_A, cast_slice(&wa)).wait().unwrap();

    let ra = rxa.wait().unwrap().expect("rxa");
    let rb = rxb.wait().unwrap().expect("rxb");
    assert_eq!(&ra[..], cast_slice::<WireU64, u8>(&wa));
    assert_eq!(&rb[..], cast_slice::<WireU64, u8>(&wb));
}

#[test]
fn ring_across_threads() {
    const TAG: u16 = 0xCAFE;
    let got = run_ranks(4, Some(Duration::from_secs(5)), |comm| {
        let me = comm.rank();
        let n = comm.size();
        let to = (me + 1) % n;
        let from = (me + n - 1) % n;
        let recv = comm.irecv(from, TAG, 8);
        let send = comm.isend(to, TAG, &(me as u64).to_le_bytes());
        send.wait().unwrap();
        let bytes = recv.wait().unwrap().expect("payload");
        u64::from_le_bytes(bytes.try_into().expect("8 bytes"))
    });
    assert_eq!(got, vec![3, 0, 1, 2]);
}

#[test]
fn timeout_names_the_silent_peer() {
    let comm = LocalComm::group(3)
        .remove(2)
        .with_timeout(Duration::from_millis(10));
    assert!(matches!(
        comm.irecv(1, 5, 4).wait(),
        Err(CommError::Timeout { peer: 1, tag: 5, .. })
    ));
}

#[cfg(feature = "mpi-support")]
#[test]
fn mpi_comm_smoke_if_available() {
    use brick_decomp::algs::communicator::MpiComm;
    let world = MpiComm::new().expect("MPI initialization failed");
    let me = world.rank();
    let n = world.size();
    const TAG: u16 = 0x1CAF;
    let to = (me + 1) % n;
    let from = (me + n - 1) % n;
    let recv = world.irecv(from, TAG, 8);
    let send = world.isend(to, TAG, &(me as u64).to_le_bytes());
    send.wait().unwrap();
    let bytes = recv.wait().unwrap().expect("payload");
    assert_eq!(u64::from_le_bytes(bytes.try_into().unwrap()), from as u64);
}
