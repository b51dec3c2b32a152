use crate::{
    tests::util::*, Access, MailWriter, Mailslot, Namespace, ReadTimeout, Sharing, SlotError,
    SlotName, SyncNamespace,
};
use color_eyre::eyre::ensure;
use std::{
    any::Any,
    os::fd::{AsFd, AsRawFd},
    rc::Rc,
};

fn assert_violation(result: Result<Rc<MailWriter>, SlotError>) -> TestResult {
    ensure!(matches!(result, Err(SlotError::SharingViolation)), "got {result:?}");
    Ok(())
}

#[test]
fn share_read_is_checked_before_lookup() -> TestResult {
    testinit();
    // An empty registry: the share-read gate fires before the name would miss.
    let ns = SyncNamespace::new();
    assert_violation(MailWriter::open(&ns, r"mailslot\nowhere", Access::GENERIC_WRITE, Sharing::WRITE))?;
    assert_violation(MailWriter::open(&ns, r"mailslot\nowhere", Access::GENERIC_WRITE, Sharing::empty()))
}

#[test]
fn open_missing_name() -> TestResult {
    testinit();
    let ns = SyncNamespace::new();
    let result = MailWriter::open(&ns, r"mailslot\absent", Access::GENERIC_WRITE, Sharing::READ);
    ensure!(matches!(result, Err(SlotError::NotFound)), "got {result:?}");
    Ok(())
}

#[test]
fn open_foreign_object() -> TestResult {
    testinit();
    let ns = SyncNamespace::new();
    let name = SlotName::new(r"mailslot\mutex")?;
    let _obj = ns.create_named(&name, &mut || Ok(Rc::new(String::from("not a slot")) as Rc<dyn Any>))?;
    let result = MailWriter::open(&ns, r"mailslot\mutex", Access::GENERIC_WRITE, Sharing::READ);
    ensure!(matches!(result, Err(SlotError::TypeMismatch)), "got {result:?}");
    Ok(())
}

#[test]
fn second_writer_needs_share_write_on_both_sides() -> TestResult {
    testinit();
    let ns = SyncNamespace::new();
    let _slot = Mailslot::create(&ns, SLOT, 0, ReadTimeout::Forever)?;

    // Sole writer: no admission check applies.
    let _w1 = MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, Sharing::READ)?;
    // The first writer did not grant share-write, so no further write access gets in.
    assert_violation(MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, Sharing::READ | Sharing::WRITE))?;
    // Write access on the head alone also blocks a read-only open that does not share write.
    assert_violation(MailWriter::open(&ns, SLOT, Access::GENERIC_READ, Sharing::READ | Sharing::WRITE))
}

#[test]
fn writers_sharing_write_stack_up() -> TestResult {
    testinit();
    let ns = SyncNamespace::new();
    let _slot = Mailslot::create(&ns, SLOT, 0, ReadTimeout::Forever)?;

    let shared = Sharing::READ | Sharing::WRITE;
    let _w1 = MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, shared)?;
    let _w2 = MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, shared)?;
    let _w3 = MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, shared)?;
    // A late joiner that does not itself share write is still rejected.
    assert_violation(MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, Sharing::READ))
}

#[test]
fn read_only_attachments_ignore_sharing() -> TestResult {
    testinit();
    let ns = SyncNamespace::new();
    let _slot = Mailslot::create(&ns, SLOT, 0, ReadTimeout::Forever)?;

    // No write access on either side: sharing flags never come into play.
    let _w1 = MailWriter::open(&ns, SLOT, Access::GENERIC_READ, Sharing::READ)?;
    let _w2 = MailWriter::open(&ns, SLOT, Access::GENERIC_READ, Sharing::READ)?;
    Ok(())
}

#[test]
fn only_the_most_recent_writer_is_consulted() -> TestResult {
    testinit();
    let ns = SyncNamespace::new();
    let _slot = Mailslot::create(&ns, SLOT, 0, ReadTimeout::Forever)?;

    let w1 = MailWriter::open(&ns, SLOT, Access::GENERIC_READ, Sharing::READ | Sharing::WRITE)?;
    let w2 = MailWriter::open(&ns, SLOT, Access::GENERIC_READ, Sharing::READ)?;

    // The head is w2, which does not share write, so a writer is turned away even though
    // w1 would have allowed it.
    assert_violation(MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, Sharing::READ | Sharing::WRITE))?;

    // Detaching w2 promotes w1 back to head, and the same open now succeeds.
    drop(w2);
    let w3 = MailWriter::open(&ns, SLOT, Access::GENERIC_WRITE, Sharing::READ | Sharing::WRITE)?;
    ensure_eq!(w3.access(), Access::GENERIC_WRITE);
    ensure_eq!(w3.sharing(), Sharing::READ | Sharing::WRITE);
    drop(w1);
    Ok(())
}

#[test]
fn writer_exposes_the_write_endpoint() -> TestResult {
    testinit();
    let (_ns, slot, writer) = slot_with_writer()?;
    // The writer's descriptor is the slot's write end, not its read end.
    ensure!(
        writer.as_fd().as_raw_fd() != slot.as_fd().as_raw_fd(),
        "writer and reader must sit on different endpoints"
    );
    ensure_eq!(Rc::as_ptr(writer.mailslot()), Rc::as_ptr(&slot));
    Ok(())
}

#[test]
fn opened_handle_carries_requested_access() -> TestResult {
    testinit();
    let ns = SyncNamespace::new();
    let _slot = Mailslot::create(&ns, SLOT, 0, ReadTimeout::Forever)?;
    let handle = crate::open_mailslot(
        &ns,
        &crate::OpenMailslotRequest {
            name: SLOT,
            access: Access::GENERIC_WRITE,
            sharing: Sharing::READ | Sharing::WRITE,
            inherit: false,
        },
    )?;
    ensure_eq!(handle.access(), Access::GENERIC_WRITE);
    ensure!(!handle.inheritable(), "inherit flag must be plumbed through");
    Ok(())
}
