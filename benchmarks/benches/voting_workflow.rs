use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use electionday::{
    Election, Store,
    types::{PartyRecord, VoterRecord},
};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

const PARTIES: [&str; 5] = ["Red", "Blue", "Green", "Yellow", "Purple"];

/// In-memory election with `voters` registered voters and five parties
fn seeded_election(voters: usize) -> Election {
    let store = Arc::new(Store::open_in_memory().unwrap());
    store.initialize_schema().unwrap();

    let voters: Vec<_> = (0..voters)
        .map(|i| VoterRecord::new(format!("{}", 10_000 + i), format!("Voter {i}")))
        .collect();
    let parties: Vec<_> = PARTIES.iter().map(|name| PartyRecord::new(*name)).collect();
    store.bulk_load(&voters, &parties).unwrap();

    Election::with_store(store)
}

/// Read paths used by the voting and results screens
fn bench_listings(c: &mut Criterion) {
    let mut group = c.benchmark_group("listings");
    group.warm_up_time(Duration::from_millis(100));

    let election = seeded_election(100);

    group.bench_function("list_all", |b| b.iter(|| black_box(election.ledger.list_all().unwrap())));

    group.bench_function("list_by_results", |b| {
        b.iter(|| black_box(election.ledger.list_by_results().unwrap()))
    });

    group.bench_function("winners", |b| b.iter(|| black_box(election.ledger.winners().unwrap())));

    group.bench_function("authenticate", |b| {
        b.iter(|| {
            election
                .registry
                .authenticate(black_box("voter 42"), black_box("10042"))
                .unwrap()
        })
    });

    group.finish();
}

/// Login, pick a party and cast, one fresh voter per iteration
fn bench_complete_voting_workflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_workflow");
    group.warm_up_time(Duration::from_millis(200));

    group.bench_function("full_voting_process", |b| {
        b.iter_batched(
            || seeded_election(1),
            |election| {
                let mut voter = election.registry.login("Voter 0", "10000").unwrap();
                let parties = election.ledger.list_all().unwrap();
                let mut party = parties[0].clone();
                black_box(election.ballot_box.cast_vote(&mut voter, &mut party).unwrap())
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_concurrent_voting(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("concurrent_voting");
    group.sample_size(20);

    for num_voters in [10, 50, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("concurrent_voters", num_voters),
            num_voters,
            |b, &num_voters| {
                b.to_async(&rt).iter(|| async move {
                    let election = Arc::new(seeded_election(num_voters));
                    let mut handles = Vec::new();

                    for i in 0..num_voters {
                        let election = election.clone();
                        handles.push(tokio::task::spawn_blocking(move || {
                            let mut voter = election
                                .registry
                                .find_by_voter_id(&format!("{}", 10_000 + i))
                                .unwrap()
                                .unwrap();
                            let mut party = election
                                .ledger
                                .find_by_name(PARTIES[i % PARTIES.len()])
                                .unwrap()
                                .unwrap();
                            election.ballot_box.cast_vote(&mut voter, &mut party).unwrap();
                        }));
                    }

                    for handle in handles {
                        handle.await.unwrap();
                    }
                    black_box(election.ledger.winners().unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_error_scenarios(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_handling");

    let election = seeded_election(1);
    let mut voter = election.registry.find_by_voter_id("10000").unwrap().unwrap();
    let mut red = election.ledger.find_by_name("Red").unwrap().unwrap();
    election.ballot_box.cast_vote(&mut voter, &mut red).unwrap();

    group.bench_function("invalid_credentials", |b| {
        b.iter(|| {
            election
                .registry
                .authenticate(black_box("Nobody"), black_box("99999"))
                .unwrap()
        })
    });

    // stale handle forces the in-transaction re-check
    group.bench_function("double_voting_prevention", |b| {
        b.iter_batched(
            || {
                let mut stale = voter.clone();
                stale.has_voted = false;
                (stale, red.clone())
            },
            |(mut stale, mut party)| {
                black_box(election.ballot_box.cast_vote(&mut stale, &mut party).is_err())
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_listings,
    bench_complete_voting_workflow,
    bench_concurrent_voting,
    bench_error_scenarios
);

criterion_main!(benches);
