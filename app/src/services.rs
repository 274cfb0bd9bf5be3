use crate::error::Result;

/// A command or query understood by one of the restaurant components.
pub trait Request {
    type Resp;
}

/// Read-only requests; nothing is written back to storage.
pub trait Queryable<Req>
where
    Req: Request,
{
    fn query(&self, req: Req) -> Result<Req::Resp>;
}

/// Requests that load a collection fresh, change it and save it once.
pub trait Commandable<Req>
where
    Req: Request,
{
    fn execute(&self, req: Req) -> Result<Req::Resp>;
}
