mod license_token;
