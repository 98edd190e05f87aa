//! Lazy, order-preserving fetch adapter over a stream of resources

use super::Fetcher;
use crate::client::{HttpClient, ReqwestClient};
use crate::types::{FetchedData, Resource};
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, FusedStream};
use futures::{Stream, StreamExt, TryStreamExt};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

/// Stream of [`FetchedData`], one per resource pulled from the input
///
/// Each poll pulls at most one resource from the input and drives exactly one
/// fetch for it; nothing is fetched ahead of demand and output order matches
/// input order. The stream ends when the input ends, without fetching.
#[must_use = "streams do nothing unless polled"]
pub struct FetchStream<S, C = ReqwestClient> {
    resources: S,
    fetcher: Fetcher<C>,
    in_flight: Option<BoxFuture<'static, FetchedData>>,
    done: bool,
}

impl<S, C> FetchStream<S, C> {
    pub(crate) fn new(resources: S, fetcher: Fetcher<C>) -> Self {
        Self {
            resources,
            fetcher,
            in_flight: None,
            done: false,
        }
    }

    /// Whether a fetch has been started but not yet yielded
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Recover the input stream
    ///
    /// Any fetch in flight is abandoned and its resource is lost.
    pub fn into_inner(self) -> S {
        self.resources
    }
}

impl<S, C> Stream for FetchStream<S, C>
where
    S: Stream<Item = Resource> + Unpin,
    C: HttpClient + 'static,
{
    type Item = FetchedData;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(fetch) = this.in_flight.as_mut() {
                let data = ready!(fetch.as_mut().poll(cx));
                this.in_flight = None;
                return Poll::Ready(Some(data));
            }

            if this.done {
                return Poll::Ready(None);
            }

            match ready!(this.resources.poll_next_unpin(cx)) {
                Some(resource) => {
                    let fetcher = this.fetcher.clone();
                    this.in_flight = Some(Box::pin(async move { fetcher.fetch(resource).await }));
                }
                None => {
                    this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let pending = usize::from(self.in_flight.is_some());
        if self.done {
            return (pending, Some(pending));
        }
        let (lower, upper) = self.resources.size_hint();
        (
            lower.saturating_add(pending),
            upper.and_then(|u| u.checked_add(pending)),
        )
    }
}

impl<S, C> FusedStream for FetchStream<S, C>
where
    S: Stream<Item = Resource> + Unpin,
    C: HttpClient + 'static,
{
    fn is_terminated(&self) -> bool {
        self.done && self.in_flight.is_none()
    }
}

impl<C: HttpClient + 'static> Fetcher<C> {
    /// Turn a stream of resources into a lazy stream of outcomes
    ///
    /// Exactly one outcome is produced per resource, in input order. Fetch
    /// failures appear as error outcomes, never as stream errors.
    pub fn fetch_stream<S>(&self, resources: S) -> FetchStream<S, C>
    where
        S: Stream<Item = Resource> + Unpin,
    {
        FetchStream::new(resources, self.clone())
    }

    /// Like [`fetch_stream`](Self::fetch_stream), for any iterator of resources
    pub fn fetch_iter<I>(&self, resources: I) -> FetchStream<stream::Iter<I::IntoIter>, C>
    where
        I: IntoIterator<Item = Resource>,
        I::IntoIter: Unpin,
    {
        FetchStream::new(stream::iter(resources), self.clone())
    }

    /// Fetch from a fallible input stream
    ///
    /// `Ok` resources are fetched exactly as in [`fetch_stream`](Self::fetch_stream).
    /// `Err` items come from the input itself, not from the network, and are
    /// passed through unmodified without performing a fetch.
    pub fn try_fetch_stream<S, E>(&self, resources: S) -> BoxStream<'static, Result<FetchedData, E>>
    where
        S: Stream<Item = Result<Resource, E>> + Send + 'static,
        E: Send + 'static,
    {
        let fetcher = self.clone();
        resources
            .and_then(move |resource| {
                let fetcher = fetcher.clone();
                async move { Ok::<_, E>(fetcher.fetch(resource).await) }
            })
            .boxed()
    }
}
