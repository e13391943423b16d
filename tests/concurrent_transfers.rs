mod common;

use std::thread;

use bank_core::{currency::Money, domain::NoTax, errors::AccountError, SharedAccount};
use common::{atm, branch, open_account};

#[test]
fn opposite_transfers_do_not_deadlock_and_conserve_money() {
    let alice = SharedAccount::new(open_account(1, 1_000_000));
    let bob = SharedAccount::new(open_account(2, 1_000_000));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let (from, to) = if worker % 2 == 0 {
                (alice.clone(), bob.clone())
            } else {
                (bob.clone(), alice.clone())
            };
            thread::spawn(move || {
                for _ in 0..250 {
                    from.transfer(branch(), &to, Money::from_cents(3), &NoTax)
                        .expect("transfer");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(alice.balance() + bob.balance(), Money::from_cents(2_000_000));
    assert_eq!(alice.balance(), Money::from_cents(1_000_000));
    assert_eq!(alice.with(|acc| acc.transfers().len()), 2_000);
    assert_eq!(bob.with(|acc| acc.transfers().len()), 2_000);
}

#[test]
fn concurrent_withdrawals_never_overdraw() {
    let account = SharedAccount::new(open_account(1, 1_000));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let account = account.clone();
            thread::spawn(move || {
                let mut refused = 0;
                for _ in 0..20 {
                    match account.withdrawal(atm(), Money::from_cents(10), &NoTax) {
                        Ok(_) => {}
                        Err(AccountError::InsufficientBalance { .. }) => refused += 1,
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
                refused
            })
        })
        .collect();
    let refused: usize = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker panicked"))
        .sum();

    assert_eq!(account.balance(), Money::zero());
    assert_eq!(refused, 100);
    assert_eq!(account.with(|acc| acc.withdrawals().len()), 100);
}

#[test]
fn concurrent_deposits_are_not_lost() {
    let account = SharedAccount::new(open_account(1, 0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let account = account.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    account
                        .deposit(branch(), Money::from_cents(1))
                        .expect("deposit");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(account.balance(), Money::from_cents(2_000));
    assert_eq!(account.transactions().len(), 2_000);
}

#[test]
fn shared_pendency_lifecycle() {
    let account = SharedAccount::new(open_account(1, 0));
    let kept = account.deposit_envelope(atm(), 1, Money::from_cents(700));
    let dropped = account.deposit_envelope(atm(), 2, Money::from_cents(50));

    account.cancel_pendency(dropped.id).expect("cancel");
    account
        .settle_pendency(kept.id, branch(), Money::from_cents(700))
        .expect("settle");

    assert_eq!(account.balance(), Money::from_cents(700));
    assert!(account.with(|acc| acc.pendencies().is_empty()));
}
