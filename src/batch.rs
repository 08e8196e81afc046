use anyhow::Context;
use bstr::BString;
use rayon::prelude::*;

use crate::chain::{ChainSet, Chainer};
use crate::index::MinimizerIndex;
use crate::map::map_frag;
use crate::options::MapOpt;
use crate::scratch::Scratch;

/// A query to map, made of one or more segments (e.g. read pairs).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub name: Option<BString>,
    pub segs: Vec<BString>,
}

impl Query {
    pub fn new<N: Into<BString>, S: Into<BString>>(name: N, seq: S) -> Self {
        Query {
            name: Some(name.into()),
            segs: vec![seq.into()],
        }
    }

    pub fn paired<N: Into<BString>, S: Into<BString>>(name: N, r1: S, r2: S) -> Self {
        Query {
            name: Some(name.into()),
            segs: vec![r1.into(), r2.into()],
        }
    }
}

/// Map every query on the current rayon pool. Each worker thread
/// reuses one scratch space; results are in the order of `queries`.
pub fn map_batch<I, C>(
    index: &I,
    chainer: &C,
    queries: &[Query],
    opt: &MapOpt,
) -> anyhow::Result<Vec<ChainSet>>
where
    I: MinimizerIndex + Sync + ?Sized,
    C: Chainer + Sync + ?Sized,
{
    opt.validate()?;
    log::info!("mapping {} queries", queries.len());
    let res: Vec<ChainSet> = queries
        .par_iter()
        .map_init(Scratch::new, |scratch, q| {
            let name = q.name.as_ref().map(|n| n.as_slice());
            map_frag(index, chainer, q.segs.as_slice(), scratch, opt, name)
        })
        .collect();
    let mapped = res.iter().filter(|cs| !cs.is_empty()).count();
    log::info!("{} of {} queries have chains", mapped, queries.len());
    Ok(res)
}

/// Like [`map_batch`], on a dedicated pool of `n_threads` threads.
pub fn map_batch_with_threads<I, C>(
    n_threads: usize,
    index: &I,
    chainer: &C,
    queries: &[Query],
    opt: &MapOpt,
) -> anyhow::Result<Vec<ChainSet>>
where
    I: MinimizerIndex + Sync + ?Sized,
    C: Chainer + Sync + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build()
        .with_context(|| format!("building a pool of {} threads", n_threads))?;
    pool.install(|| map_batch(index, chainer, queries, opt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tests::{revcomp, test_index, RunChainer};
    use crate::map::map;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn keeps_query_order() {
        init_logging();
        let (index, seq) = test_index();
        let chainer = RunChainer::default();
        let opt = MapOpt::default();
        let queries = vec![
            Query::new("a", &seq[100..900]),
            Query::new("b", &b"ACGTTTGACCA"[..]),
            Query::new("c", revcomp(&seq[1000..1800])),
            Query::paired("d", &seq[0..400], &seq[1200..1600]),
            Query::default(),
        ];

        let res = map_batch_with_threads(2, &index, &chainer, &queries, &opt).unwrap();
        assert_eq!(res.len(), queries.len());
        assert!(!res[0].is_empty());
        assert!(res[1].is_empty());
        assert!(!res[2].is_empty());
        assert!(!res[3].is_empty());
        assert!(res[4].is_empty());

        let mut scratch = Scratch::new();
        let single = map(&index, &chainer, &seq[100..900], &mut scratch, &opt, Some(b"a"));
        assert_eq!(res[0], single);
    }

    #[test]
    fn invalid_options_are_rejected() {
        init_logging();
        let (index, seq) = test_index();
        let chainer = RunChainer::default();
        let opt = MapOpt {
            mask_level: 2.0,
            ..Default::default()
        };
        let queries = vec![Query::new("a", &seq[..500])];
        let err = map_batch(&index, &chainer, &queries, &opt).unwrap_err();
        assert!(err.to_string().contains("mask_level"));
        assert!(chainer.seen.lock().unwrap().is_empty());
    }
}
