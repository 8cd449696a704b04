//! Fixed-point solver benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use flowcert_core::features::dataflow::infrastructure::zeroness::zeroness_transfer;
use flowcert_core::{build_cfg, solve, AbstractState, BinaryOp, Expr, FunctionBody, Statement};

/// Chain of diamonds: n conditionals each joining back before the next
fn diamond_chain(n: usize) -> FunctionBody {
    let mut stmts = vec![Statement::assign("x", Expr::IntLit(0))];
    for i in 0..n {
        stmts.push(Statement::if_stmt(
            Expr::var(format!("c{i}")),
            Statement::assign("x", Expr::IntLit(1)),
            Some(Statement::assign(
                "x",
                Expr::binary(BinaryOp::Add, Expr::var("x"), Expr::IntLit(1)),
            )),
        ));
    }
    stmts.push(Statement::ret(Some(Expr::var("x"))));
    FunctionBody::new("diamond_chain", stmts)
}

fn loop_nest(n: usize) -> FunctionBody {
    use flowcert_core::StmtKind;
    let mut body = Statement::block(vec![Statement::assign(
        "x",
        Expr::binary(BinaryOp::Add, Expr::var("x"), Expr::IntLit(1)),
    )]);
    for i in 0..n {
        body = Statement::synthetic(StmtKind::While {
            cond: Expr::binary(BinaryOp::Lt, Expr::var(format!("i{i}")), Expr::var("n")),
            body: Box::new(Statement::block(vec![body])),
        });
    }
    FunctionBody::new(
        "loop_nest",
        vec![
            Statement::assign("x", Expr::IntLit(0)),
            body,
            Statement::ret(Some(Expr::var("x"))),
        ],
    )
}

fn bench_solver(c: &mut Criterion) {
    let wide = build_cfg(&diamond_chain(64));
    c.bench_function("solve_diamond_chain_64", |b| {
        b.iter(|| {
            black_box(solve(
                black_box(&wide),
                AbstractState::reachable(),
                zeroness_transfer,
            ))
        })
    });

    let nested = build_cfg(&loop_nest(8));
    c.bench_function("solve_loop_nest_8", |b| {
        b.iter(|| {
            black_box(solve(
                black_box(&nested),
                AbstractState::reachable(),
                zeroness_transfer,
            ))
        })
    });

    c.bench_function("build_cfg_diamond_chain_64", |b| {
        let body = diamond_chain(64);
        b.iter(|| black_box(build_cfg(black_box(&body))));
    });
}

criterion_group!(benches, bench_solver);
criterion_main!(benches);
