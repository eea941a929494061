/*
 * Responsibility
 * - Public entry points of the middleware stack
 * - auth: security gate (filters + authorization)
 * - cors / http: transport concerns applied around the gate
 */
pub mod auth;
pub mod cors;
pub mod http;
